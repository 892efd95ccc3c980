/// SQL preview helpers for logging
pub mod sql_preview {
    /// Redact SQL statement for logging (replace quoted literals with ?)
    pub fn redact_sql_preview(sql: &str) -> String {
        let mut chars: Vec<char> = sql.chars().collect();

        for quote in ['\'', '"'] {
            let mut i = 0;
            while i < chars.len() {
                if chars[i] == quote {
                    let start = i;
                    i += 1;
                    while i < chars.len() && chars[i] != quote {
                        i += 1;
                    }
                    if i < chars.len() {
                        for item in chars.iter_mut().take(i).skip(start + 1) {
                            *item = '?';
                        }
                    }
                }
                i += 1;
            }
        }

        chars.into_iter().take(80).collect()
    }
}

/// Bootstrap counters - module-local atomics
pub mod bootstrap_counters {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SECRET_FETCHES_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static CONNECT_ATTEMPTS_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static PROBE_FAILURES_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static ACQUIRE_EXHAUSTED_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static STATEMENTS_EXECUTED_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static ARTIFACTS_WRITTEN_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static WORKFLOW_FAILED_TOTAL: AtomicUsize = AtomicUsize::new(0);

    pub fn secret_fetch() {
        SECRET_FETCHES_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connect_attempt() {
        CONNECT_ATTEMPTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn probe_failed() {
        PROBE_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn acquire_exhausted() {
        ACQUIRE_EXHAUSTED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn statement_executed() {
        STATEMENTS_EXECUTED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn artifact_written() {
        ARTIFACTS_WRITTEN_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn workflow_failed() {
        WORKFLOW_FAILED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    #[derive(Debug, Clone, Copy)]
    pub struct Snapshot {
        pub secret_fetches_total: usize,
        pub connect_attempts_total: usize,
        pub probe_failures_total: usize,
        pub acquire_exhausted_total: usize,
        pub statements_executed_total: usize,
        pub artifacts_written_total: usize,
        pub workflow_failed_total: usize,
    }

    pub fn snapshot() -> Snapshot {
        Snapshot {
            secret_fetches_total: SECRET_FETCHES_TOTAL.load(Ordering::Relaxed),
            connect_attempts_total: CONNECT_ATTEMPTS_TOTAL.load(Ordering::Relaxed),
            probe_failures_total: PROBE_FAILURES_TOTAL.load(Ordering::Relaxed),
            acquire_exhausted_total: ACQUIRE_EXHAUSTED_TOTAL.load(Ordering::Relaxed),
            statements_executed_total: STATEMENTS_EXECUTED_TOTAL.load(Ordering::Relaxed),
            artifacts_written_total: ARTIFACTS_WRITTEN_TOTAL.load(Ordering::Relaxed),
            workflow_failed_total: WORKFLOW_FAILED_TOTAL.load(Ordering::Relaxed),
        }
    }

    pub fn log_snapshot(context: &str) {
        let s = snapshot();
        tracing::info!(
            context = context,
            secret_fetches_total = s.secret_fetches_total,
            connect_attempts_total = s.connect_attempts_total,
            probe_failures_total = s.probe_failures_total,
            acquire_exhausted_total = s.acquire_exhausted_total,
            statements_executed_total = s.statements_executed_total,
            artifacts_written_total = s.artifacts_written_total,
            workflow_failed_total = s.workflow_failed_total,
            "db_bootstrap_counters_snapshot"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::bootstrap_counters;
    use super::sql_preview::redact_sql_preview;

    #[test]
    fn test_redact_sql_preview_masks_literals() {
        let sql = "CREATE USER IF NOT EXISTS 'binlog-streamer'@'%' IDENTIFIED WITH AWSAuthenticationPlugin AS 'RDS'";
        let preview = redact_sql_preview(sql);
        assert!(preview.starts_with("CREATE USER IF NOT EXISTS '???????????????'@'?'"));
        assert!(!preview.contains("binlog-streamer"));
        assert!(preview.chars().count() <= 80);
    }

    #[test]
    fn test_redact_sql_preview_leaves_unquoted_sql() {
        assert_eq!(redact_sql_preview("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_counters_are_monotonic() {
        let before = bootstrap_counters::snapshot();
        bootstrap_counters::statement_executed();
        bootstrap_counters::probe_failed();
        let after = bootstrap_counters::snapshot();
        assert!(after.statements_executed_total > before.statements_executed_total);
        assert!(after.probe_failures_total > before.probe_failures_total);
    }
}
