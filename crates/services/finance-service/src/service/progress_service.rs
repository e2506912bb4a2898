//! Progress service - Recomputes budget spend and savings goal progress.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use common::AppResult;
use domain::{budget_progress, goal_progress, AggregateOptions, ProgressReport};

use crate::repository::{BudgetRepository, SavingsGoalRepository, TransactionRepository};

/// One user's recomputed progress
#[derive(Debug, Clone, Serialize)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub report: ProgressReport,
    /// Goal completion flags rewritten during this run
    pub completions_written: usize,
}

/// Progress service trait for dependency injection.
///
/// Inactive budgets and goals are skipped unless `include_inactive` is set,
/// whether or not the store filtered them already.
#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Aggregate the user's budgets and goals and persist goal completion
    async fn recompute_user(&self, user_id: Uuid, options: AggregateOptions)
        -> AppResult<UserProgress>;
}

/// Concrete implementation of ProgressService using repositories.
pub struct ProgressManager {
    budgets: Arc<dyn BudgetRepository>,
    goals: Arc<dyn SavingsGoalRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

impl ProgressManager {
    pub fn new(
        budgets: Arc<dyn BudgetRepository>,
        goals: Arc<dyn SavingsGoalRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            budgets,
            goals,
            transactions,
        }
    }

    async fn collect_budgets(
        &self,
        user_id: Uuid,
        options: AggregateOptions,
        report: &mut ProgressReport,
    ) -> AppResult<()> {
        let budgets = self
            .budgets
            .list_by_user(user_id, options.include_inactive)
            .await?;

        for row in budgets {
            let budget = match row.budget {
                Ok(budget) if options.includes(budget.is_active) => budget,
                Ok(_) => continue,
                Err(err) => {
                    report.push_budget(row.id, Err(err));
                    continue;
                }
            };

            // Only live, well-formed budgets need a transaction query
            let window = match budget.window(options.as_of) {
                Ok(Some(window)) => window,
                outcome => {
                    report.push_budget(budget.id, outcome.map(|_| None));
                    continue;
                }
            };

            let transactions = self
                .transactions
                .list_in_category(user_id, &budget.category, window)
                .await?;
            report.push_budget(budget.id, budget_progress(&budget, &transactions, options.as_of));
        }

        Ok(())
    }

    async fn collect_goals(
        &self,
        user_id: Uuid,
        options: AggregateOptions,
        report: &mut ProgressReport,
    ) -> AppResult<usize> {
        let goals = self
            .goals
            .list_by_user(user_id, options.include_inactive)
            .await?;

        for goal in goals.iter().filter(|g| options.includes(g.is_active)) {
            report.push_goal(goal.id, goal_progress(goal));
        }

        let updates: Vec<(Uuid, bool)> = report
            .completion_updates()
            .map(|g| (g.goal_id, g.is_completed))
            .collect();
        for (goal_id, completed) in &updates {
            self.goals.set_completed(*goal_id, *completed).await?;
            debug!(%goal_id, completed, "Goal completion updated");
        }

        Ok(updates.len())
    }
}

#[async_trait]
impl ProgressService for ProgressManager {
    async fn recompute_user(
        &self,
        user_id: Uuid,
        options: AggregateOptions,
    ) -> AppResult<UserProgress> {
        let mut report = ProgressReport::default();
        self.collect_budgets(user_id, options, &mut report).await?;
        let completions_written = self.collect_goals(user_id, options, &mut report).await?;

        info!(
            %user_id,
            as_of = %options.as_of,
            budgets = report.budgets.len(),
            over_budget = report.over_budget().count(),
            not_live = report.budgets_not_live.len(),
            goals = report.goals.len(),
            failures = report.failures.len(),
            completions_written,
            "Progress recomputed"
        );

        Ok(UserProgress {
            user_id,
            as_of: options.as_of,
            report,
            completions_written,
        })
    }
}
