use std::sync::Arc;

use db_infra::TableInitConfig;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use table_init::{telemetry, wiring};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = TableInitConfig::from_env()?;
    let sdk = wiring::load_sdk_config(config.region.as_deref()).await;
    let workflow = Arc::new(wiring::workflow(&config, &sdk));

    run(service_fn(move |event: LambdaEvent<Value>| {
        let workflow = Arc::clone(&workflow);
        async move { Ok::<Value, Error>(workflow.handle(event.payload).await.into_value()) }
    }))
    .await
}
