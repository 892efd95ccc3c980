use serde::{Deserialize, Serialize};

pub const ARTIFACT_KEY: &str = "serverId.json";

/// Published once per successful bootstrap so downstream consumers can
/// identify the binlog source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapArtifact {
    pub server_id: i64,
}

impl BootstrapArtifact {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
