//! Budget utilization and savings-goal progress.
//!
//! Folds categorized transactions into per-budget spend for the current period
//! window, and derives savings-goal progress ratios. Every function here is
//! pure; persisting results is the caller's job.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::budget::{Budget, BudgetPeriod};
use crate::error::{DomainError, DomainResult};
use crate::period::DateRange;
use crate::savings_goal::SavingsGoal;
use crate::transaction::Transaction;

/// Where spend stands relative to the limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    UnderBudget,
    AtLimit,
    OverBudget,
}

/// Budget utilization snapshot for one period window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub budget_id: Uuid,
    pub category: String,
    pub period: BudgetPeriod,
    pub window: DateRange,
    pub limit: Decimal,
    /// Settled spend in the window
    pub spent: Decimal,
    /// Spend from pending transactions, not counted in `spent`
    pub pending_impact: Decimal,
    /// `limit - spent`; negative when over budget
    pub remaining: Decimal,
    /// `spent / limit`, absent for a zero limit
    pub percent_used: Option<Decimal>,
    pub status: BudgetStatus,
    pub transaction_count: usize,
}

/// Savings goal progress snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    /// `current / target`, may exceed 1
    pub raw_ratio: Decimal,
    /// `raw_ratio` clamped to `[0, 1]`
    pub display_ratio: Decimal,
    pub remaining: Decimal,
    pub exceeded: bool,
    pub is_completed: bool,
    /// Derived completion differs from the stored flag
    pub completion_changed: bool,
}

/// Compute a budget's progress on `as_of`.
///
/// Returns `Ok(None)` when the budget is not live on `as_of`.
///
/// # Errors
/// Returns an integrity error for a negative limit, an end date before the
/// start date, or amounts too large to total.
pub fn budget_progress(
    budget: &Budget,
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> DomainResult<Option<BudgetProgress>> {
    let Some(window) = budget.window(as_of)? else {
        return Ok(None);
    };

    let mut spent = Decimal::ZERO;
    let mut pending_impact = Decimal::ZERO;
    let mut transaction_count = 0;

    for txn in transactions
        .iter()
        .filter(|t| t.user_id == budget.user_id)
        .filter(|t| t.category() == Some(budget.category.as_str()))
        .filter(|t| window.contains(t.date))
    {
        if txn.is_committed() {
            spent = spent
                .checked_add(txn.amount)
                .ok_or_else(|| out_of_range("budget", budget.id))?;
            transaction_count += 1;
        } else {
            pending_impact = pending_impact
                .checked_add(txn.amount)
                .ok_or_else(|| out_of_range("budget", budget.id))?;
        }
    }

    let remaining = budget
        .amount
        .checked_sub(spent)
        .ok_or_else(|| out_of_range("budget", budget.id))?;
    let status = match remaining.cmp(&Decimal::ZERO) {
        Ordering::Less => BudgetStatus::OverBudget,
        Ordering::Equal => BudgetStatus::AtLimit,
        Ordering::Greater => BudgetStatus::UnderBudget,
    };
    let percent_used = if budget.amount.is_zero() {
        None
    } else {
        let ratio = spent
            .checked_div(budget.amount)
            .ok_or_else(|| out_of_range("budget", budget.id))?;
        Some(ratio)
    };

    Ok(Some(BudgetProgress {
        budget_id: budget.id,
        category: budget.category.clone(),
        period: budget.period,
        window,
        limit: budget.amount,
        spent,
        pending_impact,
        remaining,
        percent_used,
        status,
        transaction_count,
    }))
}

/// Compute a savings goal's progress.
///
/// # Errors
/// Returns an integrity error when the target amount is not positive or the
/// ratio does not fit in a decimal.
pub fn goal_progress(goal: &SavingsGoal) -> DomainResult<GoalProgress> {
    if goal.target_amount <= Decimal::ZERO {
        return Err(DomainError::integrity(
            "savings goal",
            goal.id,
            format!("target amount must be positive, got {}", goal.target_amount),
        ));
    }

    let raw_ratio = goal
        .current_amount
        .checked_div(goal.target_amount)
        .ok_or_else(|| out_of_range("savings goal", goal.id))?;
    let remaining = goal
        .target_amount
        .checked_sub(goal.current_amount)
        .ok_or_else(|| out_of_range("savings goal", goal.id))?
        .max(Decimal::ZERO);
    let display_ratio = raw_ratio.clamp(Decimal::ZERO, Decimal::ONE);
    let is_completed = goal.current_amount >= goal.target_amount;

    Ok(GoalProgress {
        goal_id: goal.id,
        raw_ratio,
        display_ratio,
        remaining,
        exceeded: raw_ratio > Decimal::ONE,
        is_completed,
        completion_changed: is_completed != goal.is_completed,
    })
}

fn out_of_range(entity: &'static str, id: Uuid) -> DomainError {
    DomainError::integrity(entity, id, "amounts exceed the representable range")
}

/// Options for a progress recompute
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub as_of: NaiveDate,
    /// Aggregate budgets and goals with `is_active = false` too
    pub include_inactive: bool,
}

impl AggregateOptions {
    /// Whether an item with this active flag takes part in the run
    pub fn includes(&self, is_active: bool) -> bool {
        is_active || self.include_inactive
    }
}

/// One budget or goal that could not be aggregated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub id: Uuid,
    pub reason: String,
}

/// Result of aggregating a user's budgets and goals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressReport {
    pub budgets: Vec<BudgetProgress>,
    pub goals: Vec<GoalProgress>,
    /// Budgets with no window on `as_of`
    pub budgets_not_live: Vec<Uuid>,
    pub failures: Vec<ItemFailure>,
}

impl ProgressReport {
    /// Goals whose stored completion flag needs updating
    pub fn completion_updates(&self) -> impl Iterator<Item = &GoalProgress> {
        self.goals.iter().filter(|g| g.completion_changed)
    }

    pub fn over_budget(&self) -> impl Iterator<Item = &BudgetProgress> {
        self.budgets
            .iter()
            .filter(|b| b.status == BudgetStatus::OverBudget)
    }

    /// Record one budget's outcome
    pub fn push_budget(&mut self, budget_id: Uuid, outcome: DomainResult<Option<BudgetProgress>>) {
        match outcome {
            Ok(Some(progress)) => self.budgets.push(progress),
            Ok(None) => self.budgets_not_live.push(budget_id),
            Err(err) => self.push_failure(budget_id, err),
        }
    }

    /// Record one goal's outcome
    pub fn push_goal(&mut self, goal_id: Uuid, outcome: DomainResult<GoalProgress>) {
        match outcome {
            Ok(progress) => self.goals.push(progress),
            Err(err) => self.push_failure(goal_id, err),
        }
    }

    fn push_failure(&mut self, id: Uuid, err: DomainError) {
        tracing::warn!(%id, error = %err, "Skipping item during progress aggregation");
        self.failures.push(ItemFailure {
            id,
            reason: err.to_string(),
        });
    }
}
