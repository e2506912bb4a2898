//! Categorization rule persistence.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user_category_rule::{self, ActiveModel, Entity as RuleEntity};
use common::{AppError, AppResult};
use domain::{NewCategoryRule, UserCategoryRule};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Rule repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// A user's rules, in storage order
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserCategoryRule>>;

    /// Persist an already validated rule
    async fn create(&self, rule: NewCategoryRule) -> AppResult<UserCategoryRule>;

    /// Delete one of a user's rules
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of RuleRepository
pub struct RuleStore {
    db: DatabaseConnection,
}

impl RuleStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RuleRepository for RuleStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserCategoryRule>> {
        let models = RuleEntity::find()
            .filter(user_category_rule::Column::UserId.eq(user_id))
            .order_by_asc(user_category_rule::Column::Priority)
            .order_by_asc(user_category_rule::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(UserCategoryRule::from).collect())
    }

    async fn create(&self, rule: NewCategoryRule) -> AppResult<UserCategoryRule> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(rule.user_id),
            merchant: Set(rule.merchant),
            category: Set(rule.category),
            is_regex: Set(rule.is_regex),
            priority: Set(rule.priority),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(UserCategoryRule::from(model))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = RuleEntity::delete_many()
            .filter(user_category_rule::Column::Id.eq(id))
            .filter(user_category_rule::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
