use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A consent template guests can accept (privacy policy, house rules, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub version: String,
    pub effective_from: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentLog {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub booking_token: Option<String>,
    pub consent_id: i64,
    pub guest_id: Option<i64>,
    pub accepted_at: NaiveDateTime,
    pub accepted_by: String,
    pub status: ConsentLogStatus,
    pub action: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsentLogStatus {
    /// Recorded before the booking was known.
    Pending,
    /// Linked to a booking.
    Sent,
    /// Recorded as part of check-in finalization.
    Accepted,
}

impl ConsentLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentLogStatus::Pending => "pending",
            ConsentLogStatus::Sent => "sent",
            ConsentLogStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "sent" => ConsentLogStatus::Sent,
            "accepted" => ConsentLogStatus::Accepted,
            _ => ConsentLogStatus::Pending,
        }
    }
}
