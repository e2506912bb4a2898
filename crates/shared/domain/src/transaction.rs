//! Transaction domain entity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bank transaction.
///
/// `amount`, `date`, `name`, `merchant_name` and `pending` are facts reported by
/// the bank. The classification fields are mutable; categorization only ever
/// writes `primary_category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    /// Positive amounts are money leaving the account
    pub amount: Decimal,
    pub date: NaiveDate,
    pub name: String,
    pub merchant_name: Option<String>,
    pub pending: bool,
    pub primary_category: Option<String>,
    pub detailed_category: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Text that categorization rules are matched against: the merchant name,
    /// or the raw transaction name when the bank did not resolve a merchant.
    pub fn match_field(&self) -> &str {
        match self.merchant_name.as_deref() {
            Some(merchant) if !merchant.trim().is_empty() => merchant,
            _ => &self.name,
        }
    }

    /// Category used for budgeting
    pub fn category(&self) -> Option<&str> {
        self.primary_category.as_deref()
    }

    /// Check if the transaction is settled
    pub fn is_committed(&self) -> bool {
        !self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(name: &str, merchant: Option<&str>) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            amount: dec!(4.50),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            name: name.into(),
            merchant_name: merchant.map(String::from),
            pending: false,
            primary_category: None,
            detailed_category: None,
            categories: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_match_field_prefers_merchant_name() {
        assert_eq!(txn("SQ *STARBUCKS 221", Some("Starbucks")).match_field(), "Starbucks");
    }

    #[test]
    fn test_match_field_falls_back_to_name() {
        assert_eq!(txn("SQ *STARBUCKS 221", None).match_field(), "SQ *STARBUCKS 221");
        assert_eq!(txn("ACH DEPOSIT", Some("  ")).match_field(), "ACH DEPOSIT");
    }
}
