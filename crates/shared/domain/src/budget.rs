//! Budget domain entity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{PERIOD_MONTHLY, PERIOD_QUARTERLY, PERIOD_WEEKLY, PERIOD_YEARLY};
use crate::error::{DomainError, DomainResult};
use crate::period::{self, DateRange};

/// Budget period enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => PERIOD_WEEKLY,
            BudgetPeriod::Monthly => PERIOD_MONTHLY,
            BudgetPeriod::Quarterly => PERIOD_QUARTERLY,
            BudgetPeriod::Yearly => PERIOD_YEARLY,
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            PERIOD_WEEKLY => Ok(BudgetPeriod::Weekly),
            PERIOD_MONTHLY => Ok(BudgetPeriod::Monthly),
            PERIOD_QUARTERLY => Ok(BudgetPeriod::Quarterly),
            PERIOD_YEARLY => Ok(BudgetPeriod::Yearly),
            other => Err(DomainError::validation(format!(
                "Unknown budget period: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spending limit for one category over a recurring period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    /// Spending limit per period
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: Option<NaiveDate>,
    /// Last day the budget applies (inclusive); None = open-ended
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Check the invariants a stored budget must satisfy before it is aggregated.
    pub fn validate(&self) -> DomainResult<()> {
        if self.amount < Decimal::ZERO {
            return Err(DomainError::integrity(
                "budget",
                self.id,
                "amount must not be negative",
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(DomainError::integrity(
                    "budget",
                    self.id,
                    format!("end date {} is before start date {}", end, start),
                ));
            }
        }
        Ok(())
    }

    /// Period window this budget measures on `as_of`, or None if the budget
    /// is not live that day.
    pub fn window(&self, as_of: NaiveDate) -> DomainResult<Option<DateRange>> {
        self.validate()?;
        period::window(self.period, self.start_date, self.end_date, as_of)
            .map_err(|e| DomainError::integrity("budget", self.id, e.to_string()))
    }
}
