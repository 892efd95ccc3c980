use std::io::Read;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::CliError;

/// `-` means stdin.
pub const STDIN_SOURCE: &str = "-";

pub fn read_event(source: &str) -> Result<Value, CliError> {
    let raw = if source == STDIN_SOURCE {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::ReadEvent {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| CliError::ReadEvent {
            path: PathBuf::from(source),
            source: e,
        })?
    };

    Ok(serde_json::from_str(&raw)?)
}
