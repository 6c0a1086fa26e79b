//! # Frame-Scoped Containers
//!
//! Containers that are cleared at the start of a frame, appended to from
//! many threads during one phase, and read once the phase is joined.

mod striped;

pub use striped::StripedLists;
