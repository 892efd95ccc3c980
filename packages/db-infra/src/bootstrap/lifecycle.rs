//! Custom-resource lifecycle events and responses.
//!
//! The response is the incoming event echoed back with
//! `PhysicalResourceId`, `Status` and (on failure) `Reason` set.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::DbInfraError;

/// Constant across Create/Update/Delete so the orchestrator never sees a
/// replacement.
pub const PHYSICAL_RESOURCE_ID: &str = "binlog-bootstrap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn name(self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Create" => Some(RequestType::Create),
            "Update" => Some(RequestType::Update),
            "Delete" => Some(RequestType::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    /// `None` for request types this handler does not know about
    request_type: Option<RequestType>,
    request_type_name: String,
    body: Map<String, Value>,
}

impl LifecycleEvent {
    /// Builds a minimal event, mostly useful for callers without a raw payload.
    pub fn new(request_type: RequestType) -> Self {
        let mut body = Map::new();
        body.insert(
            "RequestType".to_string(),
            Value::String(request_type.name().to_string()),
        );
        body.insert("ResourceProperties".to_string(), Value::Object(Map::new()));
        Self {
            request_type: Some(request_type),
            request_type_name: request_type.name().to_string(),
            body,
        }
    }

    /// Rejects only events that are not objects or carry no string
    /// `RequestType`. Unrecognised request types parse and are left for the
    /// caller to treat as a no-op.
    pub fn from_value(value: Value) -> Result<Self, DbInfraError> {
        let Value::Object(body) = value else {
            return Err(DbInfraError::InvalidEvent {
                detail: "event must be a JSON object".to_string(),
            });
        };

        let request_type_name = match body.get("RequestType") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(DbInfraError::InvalidEvent {
                    detail: format!("RequestType must be a string, got {other}"),
                })
            }
            None => {
                return Err(DbInfraError::InvalidEvent {
                    detail: "missing RequestType".to_string(),
                })
            }
        };

        Ok(Self {
            request_type: RequestType::from_name(&request_type_name),
            request_type_name,
            body,
        })
    }

    pub fn request_type(&self) -> Option<RequestType> {
        self.request_type
    }

    /// The `RequestType` exactly as delivered.
    pub fn request_type_name(&self) -> &str {
        &self.request_type_name
    }

    pub fn resource_properties(&self) -> Option<&Map<String, Value>> {
        self.body.get("ResourceProperties").and_then(Value::as_object)
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleResponse {
    event: Map<String, Value>,
    pub physical_resource_id: String,
    pub status: ResponseStatus,
    pub reason: Option<String>,
}

impl LifecycleResponse {
    pub fn success(event: Map<String, Value>) -> Self {
        Self {
            event,
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
            status: ResponseStatus::Success,
            reason: None,
        }
    }

    pub fn failed(event: Map<String, Value>, reason: impl Into<String>) -> Self {
        Self {
            event,
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
            status: ResponseStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Event fields first, then the response fields overriding any
    /// same-named keys the event carried.
    pub fn into_value(self) -> Value {
        let mut map = self.event;
        map.insert(
            "PhysicalResourceId".to_string(),
            Value::String(self.physical_resource_id),
        );
        map.insert(
            "Status".to_string(),
            Value::String(
                match self.status {
                    ResponseStatus::Success => "SUCCESS",
                    ResponseStatus::Failed => "FAILED",
                }
                .to_string(),
            ),
        );
        match self.reason {
            Some(reason) => {
                map.insert("Reason".to_string(), Value::String(reason));
            }
            None => {
                map.remove("Reason");
            }
        }
        Value::Object(map)
    }
}

impl Serialize for LifecycleResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.clone().into_value().serialize(serializer)
    }
}
