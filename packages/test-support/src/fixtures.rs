//! Canned payloads shaped like what the bootstrap receives in production.

use serde_json::{json, Value};

pub const TEST_SECRET_ID: &str = "arn:aws:secretsmanager:us-east-1:000000000000:secret:db-admin";
pub const TEST_BUCKET: &str = "binlog-artifacts";

/// A custom-resource event for `request_type`.
pub fn lifecycle_event(request_type: &str) -> Value {
    json!({
        "RequestType": request_type,
        "RequestId": "4f1c0a2e-0000-4000-8000-000000000001",
        "StackId": "arn:aws:cloudformation:us-east-1:000000000000:stack/binlog/1",
        "LogicalResourceId": "TableInit",
        "ResourceType": "Custom::TableInit",
        "ResourceProperties": {
            "ServiceToken": "arn:aws:lambda:us-east-1:000000000000:function:table-init"
        }
    })
}
