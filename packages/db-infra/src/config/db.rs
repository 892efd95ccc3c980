use std::env;
use std::time::Duration;

use crate::error::DbInfraError;

pub const DEFAULT_CAPTURE_USER: &str = "binlog-streamer";
pub const DEFAULT_CONNECTION_LIMIT: u32 = 100;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Pool sizing and timeouts applied to every pool the manager builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub connection_limit: u32,
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

/// Process configuration for the table-init workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInitConfig {
    /// Secret holding host/dbname/username/password
    pub secret_id: String,
    /// Bucket receiving the bootstrap artifact
    pub bucket: String,
    /// User provisioned for the change-capture reader
    pub capture_user: String,
    pub database_override: Option<String>,
    pub pool: PoolSettings,
    pub secret_cache_ttl: Option<Duration>,
    pub region: Option<String>,
}

impl TableInitConfig {
    /// Build the config from process environment variables.
    pub fn from_env() -> Result<Self, DbInfraError> {
        let secret_id = must_var("SECRET_ARN")?;
        let bucket = must_var("BUCKET_NAME")?;

        let capture_user =
            env::var("DB_USER").unwrap_or_else(|_| DEFAULT_CAPTURE_USER.to_string());
        validate_capture_user(&capture_user)?;

        let database_override = optional_var("DB_NAME_OVERRIDE");

        let connection_limit = match optional_var("DB_CONNECTION_LIMIT") {
            Some(raw) => parse_var::<u32>("DB_CONNECTION_LIMIT", &raw)?,
            None => DEFAULT_CONNECTION_LIMIT,
        };
        if connection_limit == 0 {
            return Err(DbInfraError::config(
                "DB_CONNECTION_LIMIT must be greater than zero",
            ));
        }

        let connect_timeout_ms = match optional_var("DB_CONNECT_TIMEOUT_MS") {
            Some(raw) => parse_var::<u64>("DB_CONNECT_TIMEOUT_MS", &raw)?,
            None => DEFAULT_CONNECT_TIMEOUT_MS,
        };

        let secret_cache_ttl = optional_var("SECRET_CACHE_TTL_SECS")
            .map(|raw| parse_var::<u64>("SECRET_CACHE_TTL_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            secret_id,
            bucket,
            capture_user,
            database_override,
            pool: PoolSettings {
                connection_limit,
                connect_timeout: Duration::from_millis(connect_timeout_ms),
            },
            secret_cache_ttl,
            region: optional_var("AWS_REGION"),
        })
    }
}

/// Capture user names are interpolated into `CREATE USER`/`GRANT`, so only a
/// conservative character set is accepted.
pub fn validate_capture_user(name: &str) -> Result<(), DbInfraError> {
    let valid_len = !name.is_empty() && name.len() <= 32;
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(DbInfraError::config(format!(
            "DB_USER must be 1-32 characters of [A-Za-z0-9_-], got: '{name}'"
        )))
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DbInfraError::config(format!(
            "Required environment variable '{name}' is not set"
        ))),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, DbInfraError> {
    raw.trim().parse::<T>().map_err(|_| {
        DbInfraError::config(format!(
            "Environment variable '{name}' has an invalid value: '{raw}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use serial_test::serial;

    use super::*;

    const VARS: &[&str] = &[
        "SECRET_ARN",
        "BUCKET_NAME",
        "DB_USER",
        "DB_NAME_OVERRIDE",
        "DB_CONNECTION_LIMIT",
        "DB_CONNECT_TIMEOUT_MS",
        "SECRET_CACHE_TTL_SECS",
        "AWS_REGION",
    ];

    fn set_required_env() {
        env::set_var("SECRET_ARN", "arn:aws:secretsmanager:us-east-1:123:secret:db");
        env::set_var("BUCKET_NAME", "binlog-bucket");
    }

    fn clear_test_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_test_env();
        set_required_env();

        let cfg = TableInitConfig::from_env().unwrap();
        assert_eq!(cfg.secret_id, "arn:aws:secretsmanager:us-east-1:123:secret:db");
        assert_eq!(cfg.bucket, "binlog-bucket");
        assert_eq!(cfg.capture_user, DEFAULT_CAPTURE_USER);
        assert_eq!(cfg.database_override, None);
        assert_eq!(cfg.pool, PoolSettings::default());
        assert_eq!(cfg.secret_cache_ttl, None);

        clear_test_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_test_env();
        set_required_env();
        env::set_var("DB_USER", "cdc_reader");
        env::set_var("DB_NAME_OVERRIDE", "scratch");
        env::set_var("DB_CONNECTION_LIMIT", "8");
        env::set_var("DB_CONNECT_TIMEOUT_MS", "2500");
        env::set_var("SECRET_CACHE_TTL_SECS", "300");

        let cfg = TableInitConfig::from_env().unwrap();
        assert_eq!(cfg.capture_user, "cdc_reader");
        assert_eq!(cfg.database_override.as_deref(), Some("scratch"));
        assert_eq!(cfg.pool.connection_limit, 8);
        assert_eq!(cfg.pool.connect_timeout, Duration::from_millis(2500));
        assert_eq!(cfg.secret_cache_ttl, Some(Duration::from_secs(300)));

        clear_test_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_var() {
        clear_test_env();
        env::set_var("SECRET_ARN", "arn");

        let result = TableInitConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("BUCKET_NAME"));

        clear_test_env();
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_var() {
        clear_test_env();
        set_required_env();
        env::set_var("DB_CONNECTION_LIMIT", "lots");

        let err = TableInitConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("DB_CONNECTION_LIMIT"));

        env::set_var("DB_CONNECTION_LIMIT", "0");
        let err = TableInitConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        clear_test_env();
    }

    #[test]
    fn test_validate_capture_user() {
        for ok in ["binlog-streamer", "cdc_reader", "a"] {
            assert!(validate_capture_user(ok).is_ok(), "should accept {ok}");
        }
        let too_long = "x".repeat(33);
        for bad in ["", "bob'@'%", "drop table", too_long.as_str()] {
            assert!(validate_capture_user(bad).is_err(), "should reject {bad}");
        }
    }
}
