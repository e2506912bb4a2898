//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod budget;
pub mod savings_goal;
pub mod transaction;
pub mod user;
pub mod user_category_rule;
