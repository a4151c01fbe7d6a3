//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache service.
//!
//! # Tasks
//! - TTL Sweeper: actively removes expired cache entries as their deadlines pass

mod sweeper;

pub use sweeper::spawn_sweeper_task;
