//! Finance Service - Categorization and progress batch jobs.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use domain::NewCategoryRule;
use finance_service_lib::service::BatchSummary;
use finance_service_lib::{MigrateAction, RuleAction};

#[derive(Parser)]
#[command(name = "finance-service")]
#[command(about = "Personal finance categorization and progress jobs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply categorization rules to transactions
    Categorize {
        /// Only this user (default: every user)
        #[arg(long)]
        user: Option<Uuid>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute budget and savings goal progress
    Recompute {
        #[arg(long)]
        user: Option<Uuid>,
        /// Day to evaluate period windows on (default: today, UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Include inactive budgets and goals
        #[arg(long)]
        include_inactive: bool,
        #[arg(long)]
        json: bool,
    },
    /// Manage categorization rules
    Rules {
        #[command(subcommand)]
        action: RuleCommands,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
}

#[derive(Subcommand)]
enum RuleCommands {
    /// List a user's rules in evaluation order
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Add a rule
    Add {
        #[arg(long)]
        user: Uuid,
        /// Merchant text, or a regular expression with --regex
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        regex: bool,
        /// Lower values are evaluated first
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        priority: i32,
    },
    /// Delete a rule
    Delete {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Categorize { user, json } => {
            let summary = finance_service_lib::run_categorize(user).await?;
            if json {
                print_json(&summary)?;
            } else {
                for report in &summary.succeeded {
                    println!(
                        "{}: {} examined, {} updated, {} rules skipped",
                        report.user_id,
                        report.examined,
                        report.updated,
                        report.skipped_rules.len()
                    );
                }
                print_failures(&summary);
            }
            exit_on_failures(&summary);
        }
        Commands::Recompute {
            user,
            as_of,
            include_inactive,
            json,
        } => {
            let summary = finance_service_lib::run_recompute(user, as_of, include_inactive).await?;
            if json {
                print_json(&summary)?;
            } else {
                for progress in &summary.succeeded {
                    let report = &progress.report;
                    println!(
                        "{} ({}): {} budgets, {} over, {} goals, {} completions written, {} failures",
                        progress.user_id,
                        progress.as_of,
                        report.budgets.len(),
                        report.over_budget().count(),
                        report.goals.len(),
                        progress.completions_written,
                        report.failures.len()
                    );
                }
                print_failures(&summary);
            }
            exit_on_failures(&summary);
        }
        Commands::Rules { action } => {
            let rule_action = match action {
                RuleCommands::List { user } => RuleAction::List { user_id: user },
                RuleCommands::Add {
                    user,
                    merchant,
                    category,
                    regex,
                    priority,
                } => RuleAction::Add(NewCategoryRule {
                    user_id: user,
                    merchant,
                    category,
                    is_regex: regex,
                    priority,
                }),
                RuleCommands::Delete { user, id } => RuleAction::Delete {
                    user_id: user,
                    rule_id: id,
                },
            };
            for rule in finance_service_lib::run_rules(rule_action).await? {
                let kind = if rule.is_regex { "regex" } else { "text" };
                println!(
                    "{} [{}] {} {:?} -> {}",
                    rule.id, rule.priority, kind, rule.merchant, rule.category
                );
            }
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            finance_service_lib::run_migrations(migrate_action).await?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_failures<T>(summary: &BatchSummary<T>) {
    for failure in &summary.failed {
        eprintln!("{}: {} ({})", failure.user_id, failure.reason, failure.code);
    }
}

/// Partial runs exit non-zero so schedulers notice them
fn exit_on_failures<T>(summary: &BatchSummary<T>) {
    if !summary.is_clean() {
        std::process::exit(2);
    }
}
