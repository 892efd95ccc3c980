//! Builds the production resolver, connector and object store from config.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use db_infra::bootstrap::plan::BootstrapPlan;
use db_infra::infra::db::SeaOrmConnector;
use db_infra::infra::object_store::S3ObjectStore;
use db_infra::infra::secrets::{CachedSecretResolver, SecretResolver, SecretsManagerResolver};
use db_infra::{PoolManager, TableInitConfig, TableInitWorkflow};
use tracing::info;

pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

pub fn secret_resolver(config: &TableInitConfig, sdk: &SdkConfig) -> Arc<dyn SecretResolver> {
    let resolver = SecretsManagerResolver::new(aws_sdk_secretsmanager::Client::new(sdk));
    match config.secret_cache_ttl {
        Some(ttl) => {
            info!(ttl_secs = ttl.as_secs(), "secret_cache=enabled");
            Arc::new(CachedSecretResolver::new(resolver, ttl))
        }
        None => Arc::new(resolver),
    }
}

pub fn pool_manager(config: &TableInitConfig, sdk: &SdkConfig) -> PoolManager {
    PoolManager::new(
        secret_resolver(config, sdk),
        Arc::new(SeaOrmConnector),
        config.secret_id.clone(),
        config.pool.clone(),
    )
}

pub fn workflow(config: &TableInitConfig, sdk: &SdkConfig) -> TableInitWorkflow {
    TableInitWorkflow::new(
        pool_manager(config, sdk),
        Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(sdk))),
        BootstrapPlan::new(config.capture_user.clone()),
        config.bucket.clone(),
    )
}
