//! Database bootstrap infrastructure for the binlog capture stack.
//! Used by the `table-init` CLI and the custom-resource Lambda handler.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod infra;

pub use bootstrap::lifecycle::{LifecycleEvent, LifecycleResponse, RequestType, ResponseStatus};
pub use bootstrap::workflow::TableInitWorkflow;
pub use config::db::TableInitConfig;
pub use error::DbInfraError;
pub use infra::db::core::{sanitize_db_url, PoolHandle, PoolManager};
