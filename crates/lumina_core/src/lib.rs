//! # LUMINA Core
//!
//! Frame-scoped concurrency primitives shared by the renderer:
//! - Lock-striped lists that many workers append into at once
//! - A fixed-size worker pool whose jobs are joined through handles
//!
//! ## Architecture Rules
//!
//! 1. **Frame-scoped data** - containers are reset at the start of a frame,
//!    written during one phase and read after the join point
//! 2. **No global state** - every container is owned by an explicit context
//! 3. **Low contention** - writers lock one stripe, never the whole container
//!
//! ## Example
//!
//! ```rust,ignore
//! use lumina_core::{StripedLists, WorkerPool};
//!
//! let pool = WorkerPool::new(3);
//! let lists = std::sync::Arc::new(StripedLists::<u32>::new(3072));
//! let handle = pool.spawn({
//!     let lists = lists.clone();
//!     move || lists.push(7, 42)
//! });
//! handle.join()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;
pub mod sync;

pub use error::{PoolError, PoolResult};
pub use memory::StripedLists;
pub use sync::{JobHandle, WorkerPool};
