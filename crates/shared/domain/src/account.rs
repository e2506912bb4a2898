//! Bank account domain entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account domain entity, created and refreshed by bank sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Bank-reported account type (e.g. "depository", "credit")
    pub account_type: String,
    pub current_balance: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Remaining credit line, when both the limit and the balance are known
    pub fn available_credit(&self) -> Option<Decimal> {
        match (self.credit_limit, self.current_balance) {
            (Some(limit), Some(balance)) => Some(limit - balance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(limit: Option<Decimal>, balance: Option<Decimal>) -> Account {
        Account {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Visa".into(),
            account_type: "credit".into(),
            current_balance: balance,
            available_balance: None,
            credit_limit: limit,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_credit() {
        let acct = account(Some(dec!(5000)), Some(dec!(1250.50)));
        assert_eq!(acct.available_credit(), Some(dec!(3749.50)));
    }

    #[test]
    fn test_available_credit_unknown_without_limit() {
        assert_eq!(account(None, Some(dec!(10))).available_credit(), None);
    }
}
