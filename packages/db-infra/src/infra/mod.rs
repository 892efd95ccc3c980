//! Infrastructure layer - secrets, database pools, and the artifact store.

pub mod db;
pub mod object_store;
pub mod secrets;
