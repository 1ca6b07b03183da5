//! # Core Module
//!
//! Concurrency primitives used by the terrain engine. The only resident is
//! the fork-join [`WorkerPool`]; shared read-only state (the block palette)
//! travels as plain `Arc`s and mutable state is single-owner, so no lock
//! wrappers are needed here.

mod worker_pool;

pub use worker_pool::{Job, WorkerPool};
