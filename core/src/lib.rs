//! Plan execution engine: turns untrusted, model-generated change plans into
//! safe canonical plans and runs units of work under a dependency-aware,
//! bounded-concurrency scheduler.

pub mod api;
pub mod config;
pub mod error;
pub mod plan;
pub mod scheduler;
