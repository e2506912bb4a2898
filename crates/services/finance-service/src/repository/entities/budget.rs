//! Budget database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Budget, BudgetPeriod, DomainError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// One of WEEKLY, MONTHLY, QUARTERLY, YEARLY
    pub period: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity; fails on an unknown period
impl TryFrom<Model> for Budget {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let period = BudgetPeriod::try_from(model.period.as_str())
            .map_err(|e| DomainError::integrity("budget", model.id, e.to_string()))?;

        Ok(Budget {
            id: model.id,
            user_id: model.user_id,
            category: model.category,
            amount: model.amount,
            period,
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
