//! Shared helpers for db-infra and table-init tests.

pub mod fixtures;
pub mod test_logging;
