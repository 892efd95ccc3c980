//! The ordered bootstrap statement sequence.
//!
//! Later statements depend on rows written by earlier ones (the typo fix
//! targets a bulk-inserted title, the delete targets a seeded one), so the
//! order of [`BootstrapStep::ALL`] is part of the contract.
//!
//! Only `CREATE TABLE` is guarded. Redelivering a Create after a successful
//! run duplicates the seed rows.

use std::fmt;

use sea_orm::sea_query::{ColumnDef, Expr, InsertStatement, Query, Table};
use sea_orm::{DbBackend, DeriveIden, Statement};

use crate::error::DbInfraError;

pub const BINLOG_RETENTION_HOURS: u32 = 24;
pub const SERVER_ID_COLUMN: &str = "server_id";

pub const INITIAL_SEEDS: [(&str, i32); 2] =
    [("Configure binlog retention", 1), ("Scratch row", 0)];
pub const DISCARDED_SEED_TITLE: &str = "Scratch row";
pub const BULK_SEEDS: [(&str, i32); 3] = [
    ("Grant capture user access", 2),
    ("Tail the binlog strem", 3),
    ("Archive change events", 1),
];
pub const TYPO_TITLE: &str = "Tail the binlog strem";
pub const FIXED_TITLE: &str = "Tail the binlog stream";

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Priority,
}

/// Where a step's statement applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepScope {
    /// Server administration; MySQL/RDS specific SQL
    Server,
    /// Guarded DDL
    Schema,
    /// Unguarded DML
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStep {
    SetBinlogRetention,
    CreateCaptureUser,
    GrantCaptureUser,
    CreateTable,
    InsertSeeds,
    DeleteSeed,
    BulkInsert,
    FixTitleTypo,
    ReadServerId,
}

impl BootstrapStep {
    pub const ALL: [BootstrapStep; 9] = [
        BootstrapStep::SetBinlogRetention,
        BootstrapStep::CreateCaptureUser,
        BootstrapStep::GrantCaptureUser,
        BootstrapStep::CreateTable,
        BootstrapStep::InsertSeeds,
        BootstrapStep::DeleteSeed,
        BootstrapStep::BulkInsert,
        BootstrapStep::FixTitleTypo,
        BootstrapStep::ReadServerId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BootstrapStep::SetBinlogRetention => "set_binlog_retention",
            BootstrapStep::CreateCaptureUser => "create_capture_user",
            BootstrapStep::GrantCaptureUser => "grant_capture_user",
            BootstrapStep::CreateTable => "create_table",
            BootstrapStep::InsertSeeds => "insert_seeds",
            BootstrapStep::DeleteSeed => "delete_seed",
            BootstrapStep::BulkInsert => "bulk_insert",
            BootstrapStep::FixTitleTypo => "fix_title_typo",
            BootstrapStep::ReadServerId => "read_server_id",
        }
    }

    pub fn scope(self) -> StepScope {
        match self {
            BootstrapStep::SetBinlogRetention
            | BootstrapStep::CreateCaptureUser
            | BootstrapStep::GrantCaptureUser
            | BootstrapStep::ReadServerId => StepScope::Server,
            BootstrapStep::CreateTable => StepScope::Schema,
            BootstrapStep::InsertSeeds
            | BootstrapStep::DeleteSeed
            | BootstrapStep::BulkInsert
            | BootstrapStep::FixTitleTypo => StepScope::Data,
        }
    }

    /// Steps read a row back instead of executing.
    pub fn returns_rows(self) -> bool {
        matches!(self, BootstrapStep::ReadServerId)
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStatement {
    pub step: BootstrapStep,
    pub statement: Statement,
}

/// Renders the bootstrap sequence for a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    capture_user: String,
}

impl BootstrapPlan {
    /// `capture_user` must already be validated
    /// (see `config::db::validate_capture_user`).
    pub fn new(capture_user: impl Into<String>) -> Self {
        Self {
            capture_user: capture_user.into(),
        }
    }

    /// All steps, in execution order.
    pub fn statements(&self, backend: DbBackend) -> Result<Vec<PlannedStatement>, DbInfraError> {
        self.statements_in_scope(backend, &[StepScope::Server, StepScope::Schema, StepScope::Data])
    }

    /// The steps whose scope is listed, still in execution order.
    pub fn statements_in_scope(
        &self,
        backend: DbBackend,
        scopes: &[StepScope],
    ) -> Result<Vec<PlannedStatement>, DbInfraError> {
        BootstrapStep::ALL
            .into_iter()
            .filter(|step| scopes.contains(&step.scope()))
            .map(|step| {
                Ok(PlannedStatement {
                    step,
                    statement: self.statement(step, backend)?,
                })
            })
            .collect()
    }

    fn statement(&self, step: BootstrapStep, backend: DbBackend) -> Result<Statement, DbInfraError> {
        let stmt = match step {
            BootstrapStep::SetBinlogRetention => Statement::from_string(
                backend,
                format!(
                    "CALL mysql.rds_set_configuration('binlog retention hours', {BINLOG_RETENTION_HOURS})"
                ),
            ),
            BootstrapStep::CreateCaptureUser => Statement::from_string(
                backend,
                format!(
                    "CREATE USER IF NOT EXISTS '{}'@'%' IDENTIFIED WITH AWSAuthenticationPlugin AS 'RDS'",
                    self.capture_user
                ),
            ),
            BootstrapStep::GrantCaptureUser => Statement::from_string(
                backend,
                format!(
                    "GRANT SELECT, REPLICATION CLIENT, REPLICATION SLAVE ON *.* TO '{}'@'%'",
                    self.capture_user
                ),
            ),
            BootstrapStep::CreateTable => backend.build(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    ),
            ),
            BootstrapStep::InsertSeeds => backend.build(&insert_rows(step, &INITIAL_SEEDS)?),
            BootstrapStep::DeleteSeed => backend.build(
                Query::delete()
                    .from_table(Tasks::Table)
                    .and_where(Expr::col(Tasks::Title).eq(DISCARDED_SEED_TITLE)),
            ),
            BootstrapStep::BulkInsert => backend.build(&insert_rows(step, &BULK_SEEDS)?),
            BootstrapStep::FixTitleTypo => backend.build(
                Query::update()
                    .table(Tasks::Table)
                    .value(Tasks::Title, FIXED_TITLE)
                    .and_where(Expr::col(Tasks::Title).eq(TYPO_TITLE)),
            ),
            BootstrapStep::ReadServerId => Statement::from_string(
                backend,
                format!("SELECT CAST(@@server_id AS SIGNED) AS {SERVER_ID_COLUMN}"),
            ),
        };
        Ok(stmt)
    }
}

/// One multi-row INSERT for all `rows`.
fn insert_rows(step: BootstrapStep, rows: &[(&str, i32)]) -> Result<InsertStatement, DbInfraError> {
    let mut insert = Query::insert();
    insert
        .into_table(Tasks::Table)
        .columns([Tasks::Title, Tasks::Priority]);

    for (title, priority) in rows {
        insert
            .values([(*title).into(), (*priority).into()])
            .map_err(|e| DbInfraError::StatementExecutionFailed {
                step,
                detail: format!("invalid seed row: {e}"),
            })?;
    }
    Ok(insert)
}
