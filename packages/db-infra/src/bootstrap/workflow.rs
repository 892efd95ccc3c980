//! Lifecycle handler: routes a request, runs the bootstrap on Create and
//! reports SUCCESS/FAILED.

use std::sync::Arc;
use std::time::Instant;

use sea_orm::ConnectionTrait;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::bootstrap::artifact::{BootstrapArtifact, ARTIFACT_KEY};
use crate::bootstrap::lifecycle::{LifecycleEvent, LifecycleResponse, RequestType};
use crate::bootstrap::plan::{BootstrapPlan, BootstrapStep, PlannedStatement, SERVER_ID_COLUMN};
use crate::error::DbInfraError;
use crate::infra::db::core::PoolManager;
use crate::infra::db::diagnostics::bootstrap_counters;
use crate::infra::db::diagnostics::sql_preview::redact_sql_preview;
use crate::infra::object_store::ObjectStore;

/// Result of running a plan against one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOutcome {
    pub steps_applied: usize,
    /// Set when the plan contained [`BootstrapStep::ReadServerId`]
    pub server_id: Option<i64>,
}

/// Execute `statements` strictly in order, stopping at the first failure.
///
/// Nothing is rolled back: MySQL commits DDL implicitly, so steps applied
/// before a failure stay applied.
pub async fn execute_plan<C>(
    conn: &C,
    statements: &[PlannedStatement],
) -> Result<PlanOutcome, DbInfraError>
where
    C: ConnectionTrait,
{
    let mut outcome = PlanOutcome::default();

    for planned in statements {
        let step = planned.step;
        info!(
            step = %step,
            sql = %redact_sql_preview(&planned.statement.sql),
            "bootstrap=step"
        );

        if step.returns_rows() {
            let row = conn
                .query_one(planned.statement.clone())
                .await
                .map_err(|e| step_failed(step, e))?
                .ok_or_else(|| step_failed(step, "query returned no rows"))?;
            let server_id: i64 = row
                .try_get("", SERVER_ID_COLUMN)
                .map_err(|e| step_failed(step, e))?;
            debug!(server_id, "bootstrap=server_id");
            outcome.server_id = Some(server_id);
        } else {
            let res = conn
                .execute(planned.statement.clone())
                .await
                .map_err(|e| step_failed(step, e))?;
            debug!(step = %step, rows_affected = res.rows_affected(), "bootstrap=step_done");
        }

        bootstrap_counters::statement_executed();
        outcome.steps_applied += 1;
    }

    Ok(outcome)
}

fn step_failed(step: BootstrapStep, detail: impl ToString) -> DbInfraError {
    DbInfraError::StatementExecutionFailed {
        step,
        detail: detail.to_string(),
    }
}

/// Run-once database bootstrap driven by custom-resource lifecycle events.
pub struct TableInitWorkflow {
    pools: PoolManager,
    store: Arc<dyn ObjectStore>,
    plan: BootstrapPlan,
    bucket: String,
}

impl TableInitWorkflow {
    pub fn new(
        pools: PoolManager,
        store: Arc<dyn ObjectStore>,
        plan: BootstrapPlan,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            pools,
            store,
            plan,
            bucket: bucket.into(),
        }
    }

    /// Handle a raw event. Always produces a response; failures become FAILED.
    pub async fn handle(&self, raw: Value) -> LifecycleResponse {
        let echo = match &raw {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        match LifecycleEvent::from_value(raw) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => {
                warn!(code = e.code(), error = %e, "lifecycle=rejected");
                bootstrap_counters::workflow_failed();
                LifecycleResponse::failed(echo, e.to_string())
            }
        }
    }

    pub async fn handle_event(&self, event: LifecycleEvent) -> LifecycleResponse {
        let request_type = event.request_type_name().to_string();
        let start = Instant::now();
        info!(request_type = %request_type, "lifecycle=received");

        let result = match event.request_type() {
            Some(RequestType::Create) => self.run_create().await.map(Some),
            // Nothing to change or tear down; the database outlives the resource.
            Some(RequestType::Update) | Some(RequestType::Delete) => Ok(None),
            None => {
                info!(request_type = %request_type, "lifecycle=no_op");
                Ok(None)
            }
        };

        let response = match result {
            Ok(artifact) => {
                info!(
                    request_type = %request_type,
                    server_id = artifact.map(|a| a.server_id),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lifecycle=success"
                );
                LifecycleResponse::success(event.into_body())
            }
            Err(e) => {
                error!(
                    request_type = %request_type,
                    code = e.code(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lifecycle=failed"
                );
                bootstrap_counters::workflow_failed();
                LifecycleResponse::failed(event.into_body(), e.to_string())
            }
        };

        bootstrap_counters::log_snapshot("lifecycle");
        response
    }

    /// Acquire a pool on the secret's database, apply every bootstrap step
    /// and publish the artifact.
    ///
    /// The artifact is written only after all SQL steps succeeded.
    pub async fn run_create(&self) -> Result<BootstrapArtifact, DbInfraError> {
        let handle = self.pools.acquire(None).await?;
        let conn = handle.connection();
        info!(
            database = handle.database(),
            attempts = handle.attempts(),
            "bootstrap=connected"
        );

        let statements = self.plan.statements(conn.get_database_backend())?;
        let outcome = execute_plan(conn, &statements).await?;
        let server_id = outcome.server_id.ok_or_else(|| {
            step_failed(BootstrapStep::ReadServerId, "server id was not read")
        })?;

        let artifact = BootstrapArtifact { server_id };
        let body = artifact
            .to_json_bytes()
            .map_err(|e| DbInfraError::ArtifactWriteFailed {
                bucket: self.bucket.clone(),
                key: ARTIFACT_KEY.to_string(),
                detail: e.to_string(),
            })?;
        self.store.put(&self.bucket, ARTIFACT_KEY, body).await?;
        bootstrap_counters::artifact_written();

        info!(
            steps = outcome.steps_applied,
            bucket = %self.bucket,
            key = ARTIFACT_KEY,
            "bootstrap=complete"
        );
        Ok(artifact)
    }
}
