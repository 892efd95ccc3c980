//! Database infrastructure - pool acquisition with retries, and diagnostics.

pub mod core;
pub mod diagnostics;

pub use self::core::{sanitize_db_url, ConnectionSpec, PoolConnector, PoolHandle, PoolManager, SeaOrmConnector};
pub use diagnostics::bootstrap_counters;
