//! Rule service - User-managed categorization rules.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{NewCategoryRule, UserCategoryRule};

use crate::repository::{RuleRepository, UserRepository};

/// Rule service trait for dependency injection.
#[async_trait]
pub trait RuleService: Send + Sync {
    /// Validate and store a new rule for an existing user
    async fn create_rule(&self, input: NewCategoryRule) -> AppResult<UserCategoryRule>;

    /// A user's rules in the order the categorizer evaluates them
    async fn list_rules(&self, user_id: Uuid) -> AppResult<Vec<UserCategoryRule>>;

    /// Delete one of the user's rules
    async fn delete_rule(&self, user_id: Uuid, rule_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of RuleService using repositories.
pub struct RuleManager {
    rules: Arc<dyn RuleRepository>,
    users: Arc<dyn UserRepository>,
}

impl RuleManager {
    pub fn new(rules: Arc<dyn RuleRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { rules, users }
    }
}

#[async_trait]
impl RuleService for RuleManager {
    async fn create_rule(&self, input: NewCategoryRule) -> AppResult<UserCategoryRule> {
        let input = input.validated()?;
        self.users.find_by_id(input.user_id).await?.ok_or_not_found()?;

        let rule = self.rules.create(input).await?;
        info!(user_id = %rule.user_id, rule_id = %rule.id, priority = rule.priority, "Rule created");
        Ok(rule)
    }

    async fn list_rules(&self, user_id: Uuid) -> AppResult<Vec<UserCategoryRule>> {
        let mut rules = self.rules.list_by_user(user_id).await?;
        rules.sort_by(|a, b| a.evaluation_order(b));
        Ok(rules)
    }

    async fn delete_rule(&self, user_id: Uuid, rule_id: Uuid) -> AppResult<()> {
        self.rules.delete(user_id, rule_id).await?;
        info!(%user_id, %rule_id, "Rule deleted");
        Ok(())
    }
}
