//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    SYNC_ERROR, SYNC_NEVER_SYNCED, SYNC_SYNCED, SYNC_SYNCING, SYNC_TOKEN_EXPIRED,
};

/// Bank-link synchronization state, owned by the bank-sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    NeverSynced,
    Syncing,
    Synced,
    Error,
    TokenExpired,
}

impl SyncStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::NeverSynced => SYNC_NEVER_SYNCED,
            SyncStatus::Syncing => SYNC_SYNCING,
            SyncStatus::Synced => SYNC_SYNCED,
            SyncStatus::Error => SYNC_ERROR,
            SyncStatus::TokenExpired => SYNC_TOKEN_EXPIRED,
        }
    }

    /// Whether the bank link needs the user to re-authenticate
    pub fn needs_relink(&self) -> bool {
        matches!(self, SyncStatus::TokenExpired)
    }
}

impl From<&str> for SyncStatus {
    fn from(s: &str) -> Self {
        match s {
            SYNC_SYNCING => SyncStatus::Syncing,
            SYNC_SYNCED => SyncStatus::Synced,
            SYNC_ERROR => SyncStatus::Error,
            SYNC_TOKEN_EXPIRED => SyncStatus::TokenExpired,
            _ => SyncStatus::NeverSynced,
        }
    }
}

impl From<String> for SyncStatus {
    fn from(s: String) -> Self {
        SyncStatus::from(s.as_str())
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity. Owns every account, transaction, rule, budget and goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub sync_status: SyncStatus,
    /// Bank-link item identifier (None until the user links a bank)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaid_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user that has never synced
    pub fn new(id: Uuid, email: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            name,
            sync_status: SyncStatus::NeverSynced,
            plaid_item_id: None,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_round_trip() {
        for status in [
            SyncStatus::NeverSynced,
            SyncStatus::Syncing,
            SyncStatus::Synced,
            SyncStatus::Error,
            SyncStatus::TokenExpired,
        ] {
            assert_eq!(SyncStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_sync_status_defaults_to_never_synced() {
        assert_eq!(SyncStatus::from("PAUSED"), SyncStatus::NeverSynced);
    }

    #[test]
    fn test_new_user_is_unlinked() {
        let user = User::new(Uuid::new_v4(), "a@example.com".into(), "A".into());
        assert_eq!(user.sync_status, SyncStatus::NeverSynced);
        assert!(user.plaid_item_id.is_none());
        assert!(!user.sync_status.needs_relink());
    }
}
