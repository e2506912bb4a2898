//! Finance Service Library
//!
//! Batch jobs over the personal-finance store: rule-based transaction
//! categorization and budget / savings goal progress recompute.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use common::OptionExt;
use domain::{AggregateOptions, NewCategoryRule, UserCategoryRule};

use crate::config::FinanceServiceConfig;
use crate::infra::Database;
use crate::service::{for_each_user, BatchSummary, CategorizationReport, Services, UserProgress};

/// Re-categorize one user, or every user when `user_id` is None.
pub async fn run_categorize(
    user_id: Option<Uuid>,
) -> Result<BatchSummary<CategorizationReport>, Box<dyn std::error::Error>> {
    let config = FinanceServiceConfig::from_env();
    let services = connect(&config).await?;
    let user_ids = select_users(&services, user_id).await?;

    let categorization = services.categorization.clone();
    let summary = for_each_user("categorize", user_ids, config.jobs.concurrency, |id| {
        let categorization = categorization.clone();
        async move { categorization.categorize_user(id).await }
    })
    .await;

    Ok(summary)
}

/// Recompute budget and goal progress for one user or every user.
pub async fn run_recompute(
    user_id: Option<Uuid>,
    as_of: Option<NaiveDate>,
    include_inactive: bool,
) -> Result<BatchSummary<UserProgress>, Box<dyn std::error::Error>> {
    let config = FinanceServiceConfig::from_env();
    let services = connect(&config).await?;
    let user_ids = select_users(&services, user_id).await?;

    let options = AggregateOptions {
        as_of: as_of.unwrap_or_else(|| Utc::now().date_naive()),
        include_inactive: include_inactive || config.jobs.include_inactive,
    };

    let progress = services.progress.clone();
    let summary = for_each_user("recompute", user_ids, config.jobs.concurrency, |id| {
        let progress = progress.clone();
        async move { progress.recompute_user(id, options).await }
    })
    .await;

    Ok(summary)
}

/// Rule management action type.
#[derive(Debug, Clone)]
pub enum RuleAction {
    List { user_id: Uuid },
    Add(NewCategoryRule),
    Delete { user_id: Uuid, rule_id: Uuid },
}

/// Run a rule management action; returns the affected rules.
pub async fn run_rules(action: RuleAction) -> Result<Vec<UserCategoryRule>, Box<dyn std::error::Error>> {
    let config = FinanceServiceConfig::from_env();
    let services = connect(&config).await?;

    let rules = match action {
        RuleAction::List { user_id } => services.rules.list_rules(user_id).await?,
        RuleAction::Add(input) => vec![services.rules.create_rule(input).await?],
        RuleAction::Delete { user_id, rule_id } => {
            services.rules.delete_rule(user_id, rule_id).await?;
            Vec::new()
        }
    };

    Ok(rules)
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = FinanceServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

async fn connect(config: &FinanceServiceConfig) -> Result<Services, Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    db.ping().await?;
    Ok(Services::from_connection(db.get_connection(), &config.jobs))
}

/// The requested user (which must exist), or every user.
async fn select_users(
    services: &Services,
    user_id: Option<Uuid>,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    match user_id {
        Some(id) => {
            let user = services.users.find_by_id(id).await?.ok_or_not_found()?;
            if user.sync_status.needs_relink() {
                tracing::warn!(user_id = %id, status = %user.sync_status, "User bank link needs attention");
            }
            Ok(vec![user.id])
        }
        None => Ok(services.users.list_ids().await?),
    }
}
