use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A check-in session: one token + code pair bound to a booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub id: i64,
    pub booking_id: i64,
    pub token: String,
    pub checkin_code: String,
    pub status: SessionStatus,
    pub email_status: DeliveryStatus,
    pub email_error: String,
    pub expires_at: Option<NaiveDateTime>,
    pub code_expires_at: Option<NaiveDateTime>,
    pub guest_email: String,
    pub guest_last_name: String,
    pub created_at: NaiveDateTime,
}

impl BookingInfo {
    pub fn token_valid_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at.map_or(true, |t| t > now)
    }

    pub fn code_valid_at(&self, now: NaiveDateTime) -> bool {
        self.code_expires_at.map_or(true, |t| t > now)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Initiated,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Initiated => "INITIATED",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "COMPLETED" => SessionStatus::Completed,
            "EXPIRED" => SessionStatus::Expired,
            _ => SessionStatus::Initiated,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "SENT" => DeliveryStatus::Sent,
            "FAILED" => DeliveryStatus::Failed,
            _ => DeliveryStatus::Pending,
        }
    }
}
