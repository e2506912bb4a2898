//! Budget reads.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::budget::{self, Entity as BudgetEntity};
use common::{AppError, AppResult};
use domain::{Budget, DomainResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A budget row, decoded or with the reason it could not be
#[derive(Debug, Clone)]
pub struct StoredBudget {
    pub id: Uuid,
    pub budget: DomainResult<Budget>,
}

impl From<budget::Model> for StoredBudget {
    fn from(model: budget::Model) -> Self {
        Self {
            id: model.id,
            budget: Budget::try_from(model),
        }
    }
}

/// Budget repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// A user's budgets; inactive ones only when `include_inactive` is set
    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<StoredBudget>>;
}

/// Concrete implementation of BudgetRepository
pub struct BudgetStore {
    db: DatabaseConnection,
}

impl BudgetStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BudgetRepository for BudgetStore {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<StoredBudget>> {
        let mut query = BudgetEntity::find().filter(budget::Column::UserId.eq(user_id));
        if !include_inactive {
            query = query.filter(budget::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(budget::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(StoredBudget::from).collect())
    }
}
