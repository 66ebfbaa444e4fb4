use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of account freeze recorded against a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeEventType {
    BillingFreeze,
    BillingWarning,
    ViolationFreeze,
    LegalFreeze,
    DelayedBotFreeze,
    BotFreeze,
    TrialExpirationFreeze,
}

impl FreezeEventType {
    pub fn as_i64(self) -> i64 {
        match self {
            FreezeEventType::BillingFreeze => 0,
            FreezeEventType::BillingWarning => 1,
            FreezeEventType::ViolationFreeze => 2,
            FreezeEventType::LegalFreeze => 3,
            FreezeEventType::DelayedBotFreeze => 4,
            FreezeEventType::BotFreeze => 5,
            FreezeEventType::TrialExpirationFreeze => 6,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(FreezeEventType::BillingFreeze),
            1 => Some(FreezeEventType::BillingWarning),
            2 => Some(FreezeEventType::ViolationFreeze),
            3 => Some(FreezeEventType::LegalFreeze),
            4 => Some(FreezeEventType::DelayedBotFreeze),
            5 => Some(FreezeEventType::BotFreeze),
            6 => Some(FreezeEventType::TrialExpirationFreeze),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FreezeEventType::BillingFreeze => "billing_freeze",
            FreezeEventType::BillingWarning => "billing_warning",
            FreezeEventType::ViolationFreeze => "violation_freeze",
            FreezeEventType::LegalFreeze => "legal_freeze",
            FreezeEventType::DelayedBotFreeze => "delayed_bot_freeze",
            FreezeEventType::BotFreeze => "bot_freeze",
            FreezeEventType::TrialExpirationFreeze => "trial_expiration_freeze",
        }
    }
}

impl std::fmt::Display for FreezeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeEvent {
    pub user_id: Uuid,
    pub event_type: FreezeEventType,
    /// Days left before the freeze escalates. `None` once escalated.
    pub days_till_escalation: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// An escalated freeze whose user is pending deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalatedFreeze {
    pub user_id: Uuid,
    pub event_type: FreezeEventType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_integers_round_trip() {
        for value in 0..=6 {
            let event = FreezeEventType::from_i64(value).expect("known event type");
            assert_eq!(event.as_i64(), value);
        }
        assert_eq!(FreezeEventType::from_i64(7), None);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(
            FreezeEventType::TrialExpirationFreeze.to_string(),
            "trial_expiration_freeze"
        );
    }
}
