//! Finance service configuration.

use std::env;

use common::{DatabaseConfig, JobConfig};

/// Finance service configuration.
#[derive(Debug, Clone, Default)]
pub struct FinanceServiceConfig {
    pub database: DatabaseConfig,
    pub jobs: JobConfig,
}

impl FinanceServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = DatabaseConfig {
            url: env::var("FINANCE_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.database.url),
            max_connections: env::var("FINANCE_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.database.max_connections),
            min_connections: env::var("FINANCE_DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.database.min_connections),
        };

        let jobs = JobConfig {
            concurrency: env::var("FINANCE_JOB_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.jobs.concurrency)
                .max(1),
            default_category: parse_label(env::var("FINANCE_DEFAULT_CATEGORY").ok()),
            include_inactive: env::var("FINANCE_INCLUDE_INACTIVE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.jobs.include_inactive),
        };

        Self { database, jobs }
    }
}

/// Empty or blank labels disable the fallback category.
fn parse_label(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
