//! Savings goal database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::SavingsGoal;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub target_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub current_amount: Decimal,
    pub target_date: Option<Date>,
    pub is_active: bool,
    pub is_completed: bool,
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

impl From<Model> for SavingsGoal {
    fn from(model: Model) -> Self {
        SavingsGoal {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            target_amount: model.target_amount,
            current_amount: model.current_amount,
            target_date: model.target_date,
            is_active: model.is_active,
            is_completed: model.is_completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
