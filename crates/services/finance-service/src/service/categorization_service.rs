//! Categorization service - Applies a user's rules to their transactions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{CategoryChange, RuleSet, SkippedRule};

use crate::repository::{RuleRepository, TransactionRepository};

/// Outcome of re-categorizing one user
#[derive(Debug, Clone, Serialize)]
pub struct CategorizationReport {
    pub user_id: Uuid,
    /// Transactions evaluated
    pub examined: usize,
    /// Category writes that landed
    pub updated: usize,
    pub skipped_rules: Vec<SkippedRule>,
    pub changes: Vec<CategoryChange>,
}

/// Categorization service trait for dependency injection.
#[async_trait]
pub trait CategorizationService: Send + Sync {
    /// Re-run every rule of the user over all of their transactions
    async fn categorize_user(&self, user_id: Uuid) -> AppResult<CategorizationReport>;

    /// Categorize one transaction, e.g. right after ingestion
    async fn categorize_transaction(&self, transaction_id: Uuid)
        -> AppResult<Option<CategoryChange>>;
}

/// Concrete implementation of CategorizationService using repositories.
pub struct CategorizationManager {
    rules: Arc<dyn RuleRepository>,
    transactions: Arc<dyn TransactionRepository>,
    fallback: Option<String>,
}

impl CategorizationManager {
    pub fn new(rules: Arc<dyn RuleRepository>, transactions: Arc<dyn TransactionRepository>) -> Self {
        Self {
            rules,
            transactions,
            fallback: None,
        }
    }

    /// Label applied to transactions that no rule matched and that have no category yet
    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.fallback = fallback;
        self
    }

    async fn rule_set(&self, user_id: Uuid) -> AppResult<RuleSet> {
        let rules = self.rules.list_by_user(user_id).await?;
        Ok(RuleSet::compile(&rules))
    }

    /// Write one change. Returns false when the transaction disappeared meanwhile.
    async fn apply(&self, change: &CategoryChange) -> AppResult<bool> {
        match self
            .transactions
            .set_primary_category(change.transaction_id, &change.category)
            .await
        {
            Ok(()) => {
                debug!(
                    transaction_id = %change.transaction_id,
                    previous = ?change.previous,
                    category = %change.category,
                    "Transaction categorized"
                );
                Ok(true)
            }
            Err(err) if err.is_not_found() => {
                warn!(transaction_id = %change.transaction_id, "Transaction vanished before categorization");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl CategorizationService for CategorizationManager {
    async fn categorize_user(&self, user_id: Uuid) -> AppResult<CategorizationReport> {
        let rule_set = self.rule_set(user_id).await?;
        let transactions = self.transactions.list_by_user(user_id).await?;

        let planned = rule_set.plan(&transactions, self.fallback.as_deref());
        let mut changes = Vec::with_capacity(planned.len());
        for change in planned {
            if self.apply(&change).await? {
                changes.push(change);
            }
        }

        let report = CategorizationReport {
            user_id,
            examined: transactions.len(),
            updated: changes.len(),
            skipped_rules: rule_set.skipped().to_vec(),
            changes,
        };

        info!(
            %user_id,
            rules = rule_set.rules().len(),
            skipped_rules = report.skipped_rules.len(),
            examined = report.examined,
            updated = report.updated,
            "Categorization finished"
        );

        Ok(report)
    }

    async fn categorize_transaction(
        &self,
        transaction_id: Uuid,
    ) -> AppResult<Option<CategoryChange>> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_not_found()?;

        let rule_set = self.rule_set(transaction.user_id).await?;
        let Some(change) = rule_set.change_for(&transaction, self.fallback.as_deref()) else {
            return Ok(None);
        };

        Ok(self.apply(&change).await?.then_some(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use common::AppError;
    use domain::{Transaction, UserCategoryRule, UNCATEGORIZED};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    use crate::repository::{MockRuleRepository, MockTransactionRepository};

    fn rule(user_id: Uuid, merchant: &str, category: &str, is_regex: bool, priority: i32) -> UserCategoryRule {
        let now = Utc::now();
        UserCategoryRule {
            id: Uuid::new_v4(),
            user_id,
            merchant: merchant.into(),
            category: category.into(),
            is_regex,
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(id: Uuid, user_id: Uuid, merchant: &str, category: Option<&str>) -> Transaction {
        let now = Utc::now();
        Transaction {
            id,
            user_id,
            account_id: Uuid::new_v4(),
            amount: dec!(4.75),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            name: merchant.to_uppercase(),
            merchant_name: Some(merchant.into()),
            pending: false,
            primary_category: category.map(String::from),
            detailed_category: None,
            categories: vec![],
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_categorize_user_writes_only_changed_rows() {
        let user_id = Uuid::new_v4();
        let coffee = Uuid::new_v4();
        let already = Uuid::new_v4();
        let unmatched = Uuid::new_v4();

        let mut rules = MockRuleRepository::new();
        rules.expect_list_by_user().with(eq(user_id)).returning(move |uid| {
            Ok(vec![
                rule(uid, "^Star.*", "Retail", true, 2),
                rule(uid, "Starbucks", "Coffee", false, 1),
                rule(uid, "(invalid", "Broken", true, 0),
            ])
        });

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_list_by_user().returning(move |uid| {
            Ok(vec![
                transaction(coffee, uid, "Starbucks #221", None),
                transaction(already, uid, "Starbucks #9", Some("Coffee")),
                transaction(unmatched, uid, "Gas Station", None),
            ])
        });
        transactions
            .expect_set_primary_category()
            .withf(move |id, category| *id == coffee && category == "Coffee")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let report = service.categorize_user(user_id).await.unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped_rules.len(), 1);
        assert_eq!(report.changes[0].transaction_id, coffee);
        assert_eq!(report.changes[0].category, "Coffee");
    }

    #[tokio::test]
    async fn test_categorize_user_applies_fallback_to_uncategorized_rows() {
        let user_id = Uuid::new_v4();
        let txn_id = Uuid::new_v4();

        let mut rules = MockRuleRepository::new();
        rules.expect_list_by_user().returning(|_| Ok(vec![]));

        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_list_by_user()
            .returning(move |uid| Ok(vec![transaction(txn_id, uid, "Corner Shop", None)]));
        transactions
            .expect_set_primary_category()
            .withf(move |id, category| *id == txn_id && category == UNCATEGORIZED)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions))
            .with_fallback(Some(UNCATEGORIZED.to_string()));
        let report = service.categorize_user(user_id).await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.changes[0].rule_id, None);
    }

    #[tokio::test]
    async fn test_categorize_user_is_idempotent() {
        let user_id = Uuid::new_v4();
        let txn_id = Uuid::new_v4();

        let mut rules = MockRuleRepository::new();
        rules
            .expect_list_by_user()
            .returning(|uid| Ok(vec![rule(uid, "starbucks", "Coffee", false, 1)]));

        // Second pass sees the row as already categorized
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_list_by_user()
            .returning(move |uid| Ok(vec![transaction(txn_id, uid, "Starbucks", Some("Coffee"))]));
        transactions.expect_set_primary_category().never();

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let first = service.categorize_user(user_id).await.unwrap();
        let second = service.categorize_user(user_id).await.unwrap();

        assert_eq!(first.updated, 0);
        assert_eq!(second.updated, 0);
    }

    #[tokio::test]
    async fn test_vanished_transaction_is_not_counted() {
        let user_id = Uuid::new_v4();

        let mut rules = MockRuleRepository::new();
        rules
            .expect_list_by_user()
            .returning(|uid| Ok(vec![rule(uid, "Starbucks", "Coffee", false, 1)]));

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_list_by_user().returning(|uid| {
            Ok(vec![
                transaction(Uuid::new_v4(), uid, "Starbucks", None),
                transaction(Uuid::new_v4(), uid, "Starbucks", None),
            ])
        });
        let mut calls = 0;
        transactions
            .expect_set_primary_category()
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Err(AppError::NotFound)
                } else {
                    Ok(())
                }
            });

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let report = service.categorize_user(user_id).await.unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.updated, 1);
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut rules = MockRuleRepository::new();
        rules
            .expect_list_by_user()
            .returning(|_| Err(AppError::internal("connection reset")));
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_list_by_user().never();

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let result = service.categorize_user(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_categorize_transaction() {
        let user_id = Uuid::new_v4();
        let txn_id = Uuid::new_v4();

        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .with(eq(txn_id))
            .returning(move |id| Ok(Some(transaction(id, user_id, "Starlight Mall", None))));
        transactions
            .expect_set_primary_category()
            .withf(move |id, category| *id == txn_id && category == "Retail")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut rules = MockRuleRepository::new();
        rules
            .expect_list_by_user()
            .with(eq(user_id))
            .returning(|uid| Ok(vec![rule(uid, "^Star.*", "Retail", true, 2)]));

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let change = service.categorize_transaction(txn_id).await.unwrap().unwrap();

        assert_eq!(change.category, "Retail");
        assert_eq!(change.previous, None);
    }

    #[tokio::test]
    async fn test_categorize_transaction_not_found() {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_find_by_id().returning(|_| Ok(None));
        let rules = MockRuleRepository::new();

        let service = CategorizationManager::new(Arc::new(rules), Arc::new(transactions));
        let result = service.categorize_transaction(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
