//! Lifecycle-triggered, run-once bootstrap of the capture database.

pub mod artifact;
pub mod lifecycle;
pub mod plan;
pub mod workflow;
