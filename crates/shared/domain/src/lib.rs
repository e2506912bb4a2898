//! Domain layer - Core business entities and the categorization and progress engines.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Storage-backed orchestration lives in the service crates.

pub mod account;
pub mod aggregator;
pub mod budget;
pub mod categorizer;
pub mod constants;
pub mod error;
pub mod period;
pub mod rule;
pub mod savings_goal;
pub mod transaction;
pub mod user;

pub use account::Account;
pub use aggregator::{
    budget_progress, goal_progress, AggregateOptions, BudgetProgress, BudgetStatus,
    GoalProgress, ItemFailure, ProgressReport,
};
pub use budget::{Budget, BudgetPeriod};
pub use categorizer::{Categorization, CategoryChange, CompiledRule, RuleCompilation, RuleSet, SkippedRule};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use period::DateRange;
pub use rule::{NewCategoryRule, UserCategoryRule};
pub use savings_goal::SavingsGoal;
pub use transaction::Transaction;
pub use user::{SyncStatus, User};
