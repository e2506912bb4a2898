//! Transaction reads and category writes.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::transaction::{self, Entity as TransactionEntity};
use common::{AppError, AppResult};
use domain::{DateRange, Transaction};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Transaction repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Find transaction by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Transaction>>;

    /// All of a user's transactions, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Transaction>>;

    /// A user's transactions with `primary_category == category` dated inside `window`
    async fn list_in_category(
        &self,
        user_id: Uuid,
        category: &str,
        window: DateRange,
    ) -> AppResult<Vec<Transaction>>;

    /// Overwrite `primary_category`; NotFound when the transaction is gone
    async fn set_primary_category(&self, id: Uuid, category: &str) -> AppResult<()>;
}

/// Concrete implementation of TransactionRepository
pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let result = TransactionEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Transaction::from))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Transaction>> {
        let models = TransactionEntity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::Date)
            .order_by_asc(transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Transaction::from).collect())
    }

    async fn list_in_category(
        &self,
        user_id: Uuid,
        category: &str,
        window: DateRange,
    ) -> AppResult<Vec<Transaction>> {
        let models = TransactionEntity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .filter(transaction::Column::PrimaryCategory.eq(category))
            .filter(transaction::Column::Date.gte(window.start))
            .filter(transaction::Column::Date.lt(window.end))
            .order_by_asc(transaction::Column::Date)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Transaction::from).collect())
    }

    async fn set_primary_category(&self, id: Uuid, category: &str) -> AppResult<()> {
        let result = TransactionEntity::update_many()
            .col_expr(
                transaction::Column::PrimaryCategory,
                Expr::value(category.to_string()),
            )
            .col_expr(transaction::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(transaction::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
