//! Credential resolution from the secret store.
//!
//! A resolver returns a fresh [`CredentialBundle`] per call. Retrying is the
//! caller's job; see `PoolManager::acquire`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::DbInfraError;
use crate::infra::db::diagnostics::bootstrap_counters;

/// Database credentials resolved for one connection attempt.
pub struct CredentialBundle {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub username: String,
    password: SecretString,
}

impl CredentialBundle {
    pub fn new(
        host: impl Into<String>,
        port: Option<u16>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Clone for CredentialBundle {
    fn clone(&self) -> Self {
        Self::new(
            self.host.clone(),
            self.port,
            self.database.clone(),
            self.username.clone(),
            self.password(),
        )
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct SecretPayload {
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(alias = "database")]
    dbname: String,
    username: String,
    password: String,
}

/// Parse the JSON `SecretString` of a database secret.
///
/// Accepts either `dbname` or `database` for the database name.
pub fn parse_secret_string(secret_id: &str, raw: &str) -> Result<CredentialBundle, DbInfraError> {
    let payload: SecretPayload = serde_json::from_str(raw).map_err(|e| {
        DbInfraError::secret_unavailable(secret_id, format!("unparsable secret value: {e}"))
    })?;

    Ok(CredentialBundle::new(
        payload.host,
        payload.port,
        payload.dbname,
        payload.username,
        payload.password,
    ))
}

#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Fetch and parse the secret. Fails with `SecretUnavailable`.
    async fn resolve(&self, secret_id: &str) -> Result<Arc<CredentialBundle>, DbInfraError>;

    /// Drop any cached value so the next `resolve` hits the store.
    async fn invalidate(&self, _secret_id: &str) {}
}

/// AWS Secrets Manager backed resolver.
pub struct SecretsManagerResolver {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerResolver {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretResolver for SecretsManagerResolver {
    async fn resolve(&self, secret_id: &str) -> Result<Arc<CredentialBundle>, DbInfraError> {
        bootstrap_counters::secret_fetch();

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                DbInfraError::secret_unavailable(secret_id, DisplayErrorContext(&e).to_string())
            })?;

        let raw = output
            .secret_string()
            .ok_or_else(|| DbInfraError::secret_unavailable(secret_id, "secret has no SecretString"))?;

        debug!(secret_id = secret_id, "secret=resolved");
        parse_secret_string(secret_id, raw).map(Arc::new)
    }
}

/// Time-boxed credential cache in front of another resolver.
///
/// Owned by whoever builds the pool manager; nothing here is process-global.
pub struct CachedSecretResolver<R> {
    inner: R,
    cache: Cache<String, Arc<CredentialBundle>>,
}

impl<R: SecretResolver> CachedSecretResolver<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(16).time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl<R: SecretResolver> SecretResolver for CachedSecretResolver<R> {
    async fn resolve(&self, secret_id: &str) -> Result<Arc<CredentialBundle>, DbInfraError> {
        if let Some(hit) = self.cache.get(secret_id).await {
            debug!(secret_id = secret_id, secret_cache = "hit");
            return Ok(hit);
        }

        let bundle = self.inner.resolve(secret_id).await?;
        self.cache
            .insert(secret_id.to_string(), bundle.clone())
            .await;
        Ok(bundle)
    }

    async fn invalidate(&self, secret_id: &str) {
        self.cache.invalidate(secret_id).await;
        self.inner.invalidate(secret_id).await;
    }
}
