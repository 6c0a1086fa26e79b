//! # Draw-Call Batching
//!
//! Draw calls arrive unordered from any thread. At render time they are
//! sorted by a packed `(shader, plugin, material)` key, cut into runs that
//! share a shader, and bucketed by the shader's draw order:
//!
//! ```text
//!   queue ──sort──▶ [A,p1,m1][A,p1,m2][A,p2,m1][B,p1,m1] ...
//!                   └──────── run A ─────────┘└─ run B ─┘
//!   draw order:  -10 ─▶ { run C }   0 ─▶ { run A, run B }   5 ─▶ { ... }
//! ```
//!
//! Each run then goes through its shader's pass list. Forward passes walk
//! the run in key order, rebinding plugin and material state only when it
//! changes.

mod batcher;
mod draw_call;
mod key;

pub use batcher::{DrawPlan, ShaderRun};
pub use draw_call::{DrawCall, DrawCallQueue, DrawFn};
pub use key::DrawCallKey;

pub(crate) use batcher::run_pass;
