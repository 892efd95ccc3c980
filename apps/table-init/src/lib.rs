//! Process wiring for the table-init CLI and Lambda entry points.

pub mod error;
pub mod event_input;
pub mod telemetry;
pub mod wiring;
