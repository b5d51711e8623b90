use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Customer, Room};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub reference_code: String,
    pub status: BookingStatus,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    /// Actual arrival, stamped by the finalizer.
    pub check_in: Option<NaiveDateTime>,
    /// Actual departure, stamped by checkout.
    pub check_out: Option<NaiveDateTime>,
    pub checked_in_at: Option<NaiveDateTime>,
    pub checkin_completed: bool,
    pub number_of_guests: i64,
    pub adults: i64,
    pub children: i64,
    /// Draft captured at booking time. The finalized guest list lives in `guests`.
    pub accompanying_guests: Vec<AccompanyingGuest>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_checked_in(&self) -> bool {
        self.checkin_completed || self.checked_in_at.is_some()
    }

    /// Stay length in nights. Zero when dates are missing or inverted, otherwise at least one.
    pub fn nights(&self) -> i64 {
        match (self.check_in_date, self.check_out_date) {
            (Some(from), Some(to)) => stay_nights(from, to),
            _ => 0,
        }
    }
}

pub fn stay_nights(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return 0;
    }
    (to - from).num_days().max(1)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    #[serde(rename = "Confirmed")]
    Confirmed,
    #[serde(rename = "Checked-In")]
    CheckedIn,
    #[serde(rename = "Checked-Out")]
    CheckedOut,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::CheckedIn => "Checked-In",
            BookingStatus::CheckedOut => "Checked-Out",
        }
    }

    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "checkedin" => BookingStatus::CheckedIn,
            "checkedout" => BookingStatus::CheckedOut,
            _ => BookingStatus::Confirmed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccompanyingGuest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "type")]
    pub guest_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRoom {
    pub id: i64,
    pub booking_id: i64,
    pub room: Room,
    pub nights: i64,
    pub hours: Option<i64>,
    pub status: RoomAssignmentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomAssignmentStatus {
    Reserved,
    Available,
}

impl RoomAssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomAssignmentStatus::Reserved => "Reserved",
            RoomAssignmentStatus::Available => "Available",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Reserved" => RoomAssignmentStatus::Reserved,
            _ => RoomAssignmentStatus::Available,
        }
    }
}

/// A booking loaded together with everything the check-in flow needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<Customer>,
    pub rooms: Vec<BookingRoom>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_status_parse_is_lenient() {
        assert_eq!(BookingStatus::parse("Checked-In"), BookingStatus::CheckedIn);
        assert_eq!(BookingStatus::parse("CHECKED-IN"), BookingStatus::CheckedIn);
        assert_eq!(BookingStatus::parse("Checked in"), BookingStatus::CheckedIn);
        assert_eq!(BookingStatus::parse("checked-out"), BookingStatus::CheckedOut);
        assert_eq!(BookingStatus::parse("Confirmed"), BookingStatus::Confirmed);
    }

    #[test]
    fn test_stay_nights() {
        assert_eq!(stay_nights(date("2025-06-01"), date("2025-06-04")), 3);
        assert_eq!(stay_nights(date("2025-06-01"), date("2025-06-01")), 1);
        assert_eq!(stay_nights(date("2025-06-04"), date("2025-06-01")), 0);
    }
}
