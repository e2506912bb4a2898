//! Savings goal reads and completion writes.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::savings_goal::{self, Entity as SavingsGoalEntity};
use common::{AppError, AppResult};
use domain::SavingsGoal;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Savings goal repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SavingsGoalRepository: Send + Sync {
    /// A user's goals; inactive ones only when `include_inactive` is set
    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<SavingsGoal>>;

    /// Persist the derived completion flag
    async fn set_completed(&self, id: Uuid, completed: bool) -> AppResult<()>;
}

/// Concrete implementation of SavingsGoalRepository
pub struct SavingsGoalStore {
    db: DatabaseConnection,
}

impl SavingsGoalStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SavingsGoalRepository for SavingsGoalStore {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<SavingsGoal>> {
        let mut query =
            SavingsGoalEntity::find().filter(savings_goal::Column::UserId.eq(user_id));
        if !include_inactive {
            query = query.filter(savings_goal::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(savings_goal::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SavingsGoal::from).collect())
    }

    async fn set_completed(&self, id: Uuid, completed: bool) -> AppResult<()> {
        let result = SavingsGoalEntity::update_many()
            .col_expr(savings_goal::Column::IsCompleted, Expr::value(completed))
            .col_expr(savings_goal::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(savings_goal::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
