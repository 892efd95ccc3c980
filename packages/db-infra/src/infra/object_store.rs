//! Durable blob store used for the bootstrap artifact.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::DbInfraError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), DbInfraError>;
}

/// Amazon S3 implementation.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), DbInfraError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| DbInfraError::ArtifactWriteFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        info!(bucket = bucket, key = key, bytes = size, "artifact=uploaded");
        Ok(())
    }
}
