//! # Worker Pool
//!
//! ## The Problem
//!
//! ```text
//! Main thread:   build draw calls ──────────────┐
//! Lighting work: directional | point | spot ────┤ must finish before upload
//!                                               ▼
//!                                      join (the only blocking point)
//! ```
//!
//! ## The Solution
//!
//! A fixed set of workers drains a shared job channel. Each job reports
//! through its own one-shot channel, so the caller joins exactly the jobs
//! it submitted.

mod worker_pool;

pub use worker_pool::{JobHandle, WorkerPool};
