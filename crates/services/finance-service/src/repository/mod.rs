//! Repository layer for data access.

pub mod entities;
mod budget_repository;
mod rule_repository;
mod savings_goal_repository;
mod transaction_repository;
mod user_repository;

pub use budget_repository::{BudgetRepository, BudgetStore, StoredBudget};
pub use rule_repository::{RuleRepository, RuleStore};
pub use savings_goal_repository::{SavingsGoalRepository, SavingsGoalStore};
pub use transaction_repository::{TransactionRepository, TransactionStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use budget_repository::MockBudgetRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use rule_repository::MockRuleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use savings_goal_repository::MockSavingsGoalRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_repository::MockTransactionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
