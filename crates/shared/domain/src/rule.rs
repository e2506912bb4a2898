//! User-managed categorization rules.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::categorizer::build_pattern;
use crate::error::{DomainError, DomainResult};

/// A (merchant pattern, category, priority) rule owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCategoryRule {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Literal merchant text, or a regular expression when `is_regex` is set
    pub merchant: String,
    pub category: String,
    pub is_regex: bool,
    /// Lower values are evaluated first
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserCategoryRule {
    /// Evaluation order: priority, then creation time, then id.
    pub fn evaluation_order(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Rule creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategoryRule {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Merchant pattern must be 1-255 characters"))]
    pub merchant: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub priority: i32,
}

impl NewCategoryRule {
    /// Validate field constraints and, for regex rules, that the pattern compiles.
    ///
    /// Stored rules are still tolerated by the categorizer if they are broken;
    /// this check only gives immediate feedback at creation time.
    pub fn validated(self) -> DomainResult<Self> {
        self.validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.merchant.trim().is_empty() {
            return Err(DomainError::validation("Merchant pattern cannot be blank"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("Category cannot be blank"));
        }
        if self.is_regex {
            build_pattern(&self.merchant)?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rule(priority: i32, created_offset_secs: i64) -> UserCategoryRule {
        let created = Utc::now() + Duration::seconds(created_offset_secs);
        UserCategoryRule {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            merchant: "x".into(),
            category: "y".into(),
            is_regex: false,
            priority,
            created_at: created,
            updated_at: created,
        }
    }

    fn new_rule(merchant: &str, category: &str, is_regex: bool) -> NewCategoryRule {
        NewCategoryRule {
            user_id: Uuid::new_v4(),
            merchant: merchant.into(),
            category: category.into(),
            is_regex,
            priority: 0,
        }
    }

    #[test]
    fn test_priority_orders_before_creation_time() {
        let older_low_priority = rule(5, 0);
        let newer_high_priority = rule(1, 60);
        assert_eq!(
            newer_high_priority.evaluation_order(&older_low_priority),
            Ordering::Less
        );
    }

    #[test]
    fn test_priority_tie_broken_by_creation_time() {
        let first = rule(1, 0);
        let second = rule(1, 30);
        assert_eq!(first.evaluation_order(&second), Ordering::Less);
        assert_eq!(second.evaluation_order(&first), Ordering::Greater);
    }

    #[test]
    fn test_valid_new_rule() {
        assert!(new_rule("Starbucks", "Coffee", false).validated().is_ok());
        assert!(new_rule("^Star.*", "Retail", true).validated().is_ok());
    }

    #[test]
    fn test_blank_merchant_rejected() {
        let err = new_rule("   ", "Coffee", false).validated().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_empty_category_rejected() {
        assert!(new_rule("Starbucks", "", false).validated().is_err());
    }

    #[test]
    fn test_invalid_regex_rejected_at_creation() {
        let err = new_rule("(invalid", "Coffee", true).validated().unwrap_err();
        assert!(matches!(err, DomainError::RuleConfiguration(_)));
    }

    #[test]
    fn test_regex_syntax_allowed_in_literal_rule() {
        assert!(new_rule("(invalid", "Coffee", false).validated().is_ok());
    }
}
