use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::errors::ReportError;

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "postgres";
const DEFAULT_REPORT_LIMIT: i64 = 50;
const MAX_REPORT_LIMIT: i64 = 10_000;

/// Connection parameters for the hosted Postgres instance.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: PgSslMode,
}

impl DatabaseConfig {
    /// Builds sqlx connect options.
    ///
    /// No `options` startup parameter is sent: transaction-mode poolers refuse
    /// it. Read-only access is enforced per query instead, see `db::Database`.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode)
            .application_name("membership-sync-tools")
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Row limit bound into every report query.
    pub report_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ReportError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ReportError> {
            lookup(key)
                .ok_or_else(|| {
                    ReportError::Config(format!("{} environment variable required", key))
                })
                .and_then(|value| {
                    if value.trim().is_empty() {
                        return Err(ReportError::Config(format!("{} cannot be empty", key)));
                    }
                    Ok(value)
                })
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            port: optional("DB_PORT")
                .map(|port| {
                    port.trim().parse::<u16>().map_err(|_| {
                        ReportError::Config(
                            "DB_PORT must be a valid number between 1-65535".to_string(),
                        )
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            database: optional("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            ssl_mode: optional("DB_SSLMODE")
                .map(|mode| {
                    PgSslMode::from_str(mode.trim()).map_err(|_| {
                        ReportError::Config(format!("DB_SSLMODE {:?} is not a valid sslmode", mode))
                    })
                })
                .transpose()?
                .unwrap_or(PgSslMode::Require),
        };

        let report_limit = optional("REPORT_LIMIT")
            .map(|limit| {
                limit
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|l| (1..=MAX_REPORT_LIMIT).contains(l))
                    .ok_or_else(|| {
                        ReportError::Config(format!(
                            "REPORT_LIMIT must be a number between 1-{}",
                            MAX_REPORT_LIMIT
                        ))
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_REPORT_LIMIT);

        let config = Self {
            database,
            report_limit,
        };

        tracing::debug!(
            "Database: {}@{}:{}/{}",
            config.database.user,
            config.database.host,
            config.database.port,
            config.database.database
        );
        tracing::debug!("Report limit: {}", config.report_limit);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DB_HOST", "db.example.supabase.co"),
        ("DB_USER", "postgres"),
        ("DB_PASSWORD", "hunter2"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.database, "postgres");
        assert!(matches!(config.database.ssl_mode, PgSslMode::Require));
        assert_eq!(config.report_limit, 50);
    }

    #[test]
    fn test_missing_password_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DB_HOST", "localhost"),
            ("DB_USER", "postgres"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn test_blank_host_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DB_HOST", "   "),
            ("DB_USER", "postgres"),
            ("DB_PASSWORD", "x"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_HOST cannot be empty"));
    }

    #[test]
    fn test_overrides_parsed() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("DB_PORT", "6543"),
            ("DB_NAME", "beehive"),
            ("DB_SSLMODE", "disable"),
            ("REPORT_LIMIT", "200"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.database, "beehive");
        assert!(matches!(config.database.ssl_mode, PgSslMode::Disable));
        assert_eq!(config.report_limit, 200);
    }

    #[test]
    fn test_report_limit_out_of_range() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("REPORT_LIMIT", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_connect_options_send_no_startup_options() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();
        let options = config.database.connect_options();
        assert_eq!(options.get_options(), None);
        assert_eq!(options.get_host(), "db.example.supabase.co");
        assert_eq!(options.get_application_name(), Some("membership-sync-tools"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
