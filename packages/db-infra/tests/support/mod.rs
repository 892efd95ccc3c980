//! Fakes for the pool manager and workflow seams.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use db_infra::bootstrap::plan::BootstrapPlan;
use db_infra::config::db::PoolSettings;
use db_infra::infra::db::{ConnectionSpec, PoolConnector};
use db_infra::infra::object_store::ObjectStore;
use db_infra::infra::secrets::{CredentialBundle, SecretResolver};
use db_infra::{DbInfraError, PoolManager, TableInitWorkflow};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, RuntimeErr};
use test_support::fixtures::{TEST_BUCKET, TEST_SECRET_ID};
use tokio::time::Instant;

pub const CAPTURE_USER: &str = "binlog-streamer";

pub fn init_logging() {
    test_support::test_logging::init();
}

pub fn creds(password: &str) -> CredentialBundle {
    CredentialBundle::new("stream-db.internal", Some(3306), "martzcodes", "clusteradmin", password)
}

#[derive(Default)]
struct ResolverState {
    queued: VecDeque<Result<CredentialBundle, DbInfraError>>,
    fallback: Option<CredentialBundle>,
    resolve_calls: usize,
    invalidate_calls: usize,
}

/// Hands out queued results, then `fallback` forever.
#[derive(Clone, Default)]
pub struct FakeSecretResolver {
    state: Arc<Mutex<ResolverState>>,
}

impl FakeSecretResolver {
    pub fn always(bundle: CredentialBundle) -> Self {
        let resolver = Self::default();
        resolver.state.lock().unwrap().fallback = Some(bundle);
        resolver
    }

    pub fn queue(&self, result: Result<CredentialBundle, DbInfraError>) -> &Self {
        self.state.lock().unwrap().queued.push_back(result);
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.state.lock().unwrap().resolve_calls
    }

    pub fn invalidate_calls(&self) -> usize {
        self.state.lock().unwrap().invalidate_calls
    }
}

#[async_trait]
impl SecretResolver for FakeSecretResolver {
    async fn resolve(&self, secret_id: &str) -> Result<Arc<CredentialBundle>, DbInfraError> {
        let mut state = self.state.lock().unwrap();
        state.resolve_calls += 1;
        if let Some(next) = state.queued.pop_front() {
            return next.map(Arc::new);
        }
        match &state.fallback {
            Some(bundle) => Ok(Arc::new(bundle.clone())),
            None => Err(DbInfraError::secret_unavailable(secret_id, "no fake secret queued")),
        }
    }

    async fn invalidate(&self, _secret_id: &str) {
        self.state.lock().unwrap().invalidate_calls += 1;
    }
}

#[derive(Debug, Clone)]
pub struct ConnectCall {
    pub at: Instant,
    pub database: String,
    pub username: String,
    pub password: String,
    pub connection_limit: u32,
}

/// Connector returning queued outcomes. Unqueued calls fail.
#[derive(Default)]
pub struct FakeConnector {
    outcomes: Mutex<VecDeque<Result<DatabaseConnection, DbErr>>>,
    calls: Mutex<Vec<ConnectCall>>,
    handed_out: Mutex<Vec<DatabaseConnection>>,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, conn: DatabaseConnection) {
        self.outcomes.lock().unwrap().push_back(Ok(conn));
    }

    pub fn push_refused(&self) {
        self.outcomes.lock().unwrap().push_back(Err(refused()));
    }

    pub fn calls(&self) -> Vec<ConnectCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Takes the most recent connection returned, sharing the mock's
    /// statement log.
    pub fn last_connection(&self) -> Option<DatabaseConnection> {
        self.handed_out.lock().unwrap().pop()
    }
}

#[async_trait]
impl PoolConnector for FakeConnector {
    async fn connect(&self, spec: &ConnectionSpec) -> Result<DatabaseConnection, DbErr> {
        self.calls.lock().unwrap().push(ConnectCall {
            at: Instant::now(),
            database: spec.database.clone(),
            username: spec.username.clone(),
            password: spec.password().to_string(),
            connection_limit: spec.settings.connection_limit,
        });

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(refused()));
        match outcome {
            Ok(DatabaseConnection::MockDatabaseConnection(mock)) => {
                self.handed_out
                    .lock()
                    .unwrap()
                    .push(DatabaseConnection::MockDatabaseConnection(Arc::clone(&mock)));
                Ok(DatabaseConnection::MockDatabaseConnection(mock))
            }
            other => other,
        }
    }
}

pub fn refused() -> DbErr {
    DbErr::Conn(RuntimeErr::Internal("connection refused".to_string()))
}

pub fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

/// A MySQL mock whose liveness probe succeeds.
pub fn healthy_mysql() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::MySql).append_exec_results([exec_ok()])
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingObjectStore {
    puts: Mutex<Vec<PutCall>>,
    fail: bool,
}

impl RecordingObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            puts: Mutex::default(),
            fail: true,
        })
    }

    pub fn puts(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), DbInfraError> {
        if self.fail {
            return Err(DbInfraError::ArtifactWriteFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: "AccessDenied".to_string(),
            });
        }
        self.puts.lock().unwrap().push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
        });
        Ok(())
    }
}

pub fn pool_manager(resolver: FakeSecretResolver, connector: Arc<FakeConnector>) -> PoolManager {
    PoolManager::new(
        Arc::new(resolver),
        connector,
        TEST_SECRET_ID,
        PoolSettings::default(),
    )
}

pub fn workflow(
    resolver: FakeSecretResolver,
    connector: Arc<FakeConnector>,
    store: Arc<RecordingObjectStore>,
) -> TableInitWorkflow {
    TableInitWorkflow::new(
        pool_manager(resolver, connector),
        store,
        BootstrapPlan::new(CAPTURE_USER),
        TEST_BUCKET,
    )
}
