use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a console user, stored as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Inactive,
    Active,
    Deleted,
    PendingDeletion,
    LegalHold,
    PendingBotVerification,
}

impl UserStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            UserStatus::Inactive => 0,
            UserStatus::Active => 1,
            UserStatus::Deleted => 2,
            UserStatus::PendingDeletion => 3,
            UserStatus::LegalHold => 4,
            UserStatus::PendingBotVerification => 5,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(UserStatus::Inactive),
            1 => Some(UserStatus::Active),
            2 => Some(UserStatus::Deleted),
            3 => Some(UserStatus::PendingDeletion),
            4 => Some(UserStatus::LegalHold),
            5 => Some(UserStatus::PendingBotVerification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub status: UserStatus,
    /// When `status` last changed. This is the "marked at" time for pending deletion.
    pub status_updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub email_change_verification_step: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub short_name: Option<String>,
    pub external_id: Option<String>,
}

/// Partial user update.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub short_name: Option<Option<String>>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    pub external_id: Option<Option<String>>,
    pub email_change_verification_step: Option<i64>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.short_name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.external_id.is_none()
            && self.email_change_verification_step.is_none()
    }

    /// The anonymizing update applied when an account is deactivated.
    pub fn anonymize(user_id: Uuid, email_domain: &str) -> Self {
        Self {
            full_name: Some(String::new()),
            short_name: Some(None),
            email: Some(anonymized_email(user_id, email_domain)),
            status: Some(UserStatus::Deleted),
            external_id: Some(None),
            email_change_verification_step: Some(0),
        }
    }
}

/// Placeholder address that keeps the unique email constraint satisfied after deactivation.
pub fn anonymized_email(user_id: Uuid, email_domain: &str) -> String {
    format!("deactivated+{}@{}", user_id, email_domain)
}

/// A user eligible for deletion, as returned by the pending-deletion listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUser {
    pub id: Uuid,
    pub status_updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_integer() {
        for status in [
            UserStatus::Inactive,
            UserStatus::Active,
            UserStatus::Deleted,
            UserStatus::PendingDeletion,
            UserStatus::LegalHold,
            UserStatus::PendingBotVerification,
        ] {
            assert_eq!(UserStatus::from_i64(status.as_i64()), Some(status));
        }
        assert_eq!(UserStatus::from_i64(42), None);
    }

    #[test]
    fn test_anonymize_clears_identifying_fields() {
        let id = Uuid::new_v4();
        let update = UpdateUser::anonymize(id, "deleted.invalid");

        assert_eq!(update.full_name.as_deref(), Some(""));
        assert_eq!(update.short_name, Some(None));
        assert_eq!(update.external_id, Some(None));
        assert_eq!(update.status, Some(UserStatus::Deleted));
        assert_eq!(update.email_change_verification_step, Some(0));
        assert_eq!(
            update.email.as_deref(),
            Some(format!("deactivated+{}@deleted.invalid", id).as_str())
        );
    }

    #[test]
    fn test_default_update_is_empty() {
        assert!(UpdateUser::default().is_empty());
        assert!(!UpdateUser::anonymize(Uuid::new_v4(), "x").is_empty());
    }
}
