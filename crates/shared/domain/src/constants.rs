//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Categorization
// =============================================================================

/// Label callers may apply to transactions no rule matched
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Upper bound on a compiled rule pattern, in bytes
pub const MAX_RULE_PATTERN_SIZE: usize = 256 * 1024;

// =============================================================================
// User Sync Status
// =============================================================================

pub const SYNC_NEVER_SYNCED: &str = "NEVER_SYNCED";
pub const SYNC_SYNCING: &str = "SYNCING";
pub const SYNC_SYNCED: &str = "SYNCED";
pub const SYNC_ERROR: &str = "ERROR";
pub const SYNC_TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";

// =============================================================================
// Budget Periods
// =============================================================================

pub const PERIOD_WEEKLY: &str = "WEEKLY";
pub const PERIOD_MONTHLY: &str = "MONTHLY";
pub const PERIOD_QUARTERLY: &str = "QUARTERLY";
pub const PERIOD_YEARLY: &str = "YEARLY";

/// All valid period values
pub const VALID_PERIODS: &[&str] = &[PERIOD_WEEKLY, PERIOD_MONTHLY, PERIOD_QUARTERLY, PERIOD_YEARLY];

/// Days in a weekly budget window
pub const DAYS_PER_WEEK: i64 = 7;

/// Months in a quarterly budget window
pub const MONTHS_PER_QUARTER: u32 = 3;
