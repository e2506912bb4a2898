//! Service container - Wires repositories into services.

use std::sync::Arc;

use common::JobConfig;
use sea_orm::DatabaseConnection;

use super::{
    CategorizationManager, CategorizationService, ProgressManager, ProgressService, RuleManager,
    RuleService,
};
use crate::repository::{
    BudgetStore, RuleStore, SavingsGoalStore, TransactionStore, UserRepository, UserStore,
};

/// Concrete services sharing one connection pool
pub struct Services {
    pub users: Arc<dyn UserRepository>,
    pub categorization: Arc<dyn CategorizationService>,
    pub progress: Arc<dyn ProgressService>,
    pub rules: Arc<dyn RuleService>,
}

impl Services {
    /// Create service container from database connection and job config
    pub fn from_connection(db: DatabaseConnection, jobs: &JobConfig) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(db.clone()));
        let rules = Arc::new(RuleStore::new(db.clone()));
        let transactions = Arc::new(TransactionStore::new(db.clone()));
        let budgets = Arc::new(BudgetStore::new(db.clone()));
        let goals = Arc::new(SavingsGoalStore::new(db));

        let categorization = CategorizationManager::new(rules.clone(), transactions.clone())
            .with_fallback(jobs.default_category.clone());

        Self {
            categorization: Arc::new(categorization),
            progress: Arc::new(ProgressManager::new(budgets, goals, transactions)),
            rules: Arc::new(RuleManager::new(rules, users.clone())),
            users,
        }
    }
}
