use chrono::{DateTime, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;

use crate::db::queries::{self, NewBookingRecord};
use crate::errors::AppError;
use crate::models::{stay_nights, AccompanyingGuest, BookingDetails, RoomAssignmentStatus};
use crate::services::tokens;

const MAX_REFERENCE_ATTEMPTS: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBooking {
    pub customer_id: i64,
    pub room_ids: Vec<i64>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub adults: Option<i64>,
    pub children: Option<i64>,
    pub accompanying_guests: Vec<GuestDraft>,
    pub send_checkin_link: bool,
}

/// Loosely shaped accompanying-guest entry as submitted at booking time.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GuestDraft {
    #[serde(alias = "fullName", alias = "full_name")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub guest_type: Option<String>,
}

/// Drops unnamed entries and defaults the type to `Adult`.
pub fn normalize_guest_drafts(drafts: &[GuestDraft]) -> Vec<AccompanyingGuest> {
    drafts
        .iter()
        .filter_map(|d| {
            let name = d.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
            let guest_type = d
                .guest_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("Adult");
            Some(AccompanyingGuest {
                full_name: name.to_string(),
                guest_type: guest_type.to_string(),
            })
        })
        .collect()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_stay_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_optional_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_stay_date(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} must be YYYY-MM-DD"))),
        None => Ok(None),
    }
}

/// Creates a confirmed booking and reserves its rooms.
pub fn create_booking(conn: &mut Connection, input: &NewBooking) -> Result<BookingDetails, AppError> {
    if input.room_ids.is_empty() {
        return Err(AppError::Validation("at least one roomId is required".to_string()));
    }
    let check_in_date = parse_optional_date(input.check_in_date.as_deref(), "checkInDate")?;
    let check_out_date = parse_optional_date(input.check_out_date.as_deref(), "checkOutDate")?;
    let nights = match (check_in_date, check_out_date) {
        (Some(from), Some(to)) if to < from => {
            return Err(AppError::Validation(
                "checkOutDate must not be before checkInDate".to_string(),
            ));
        }
        (Some(from), Some(to)) => stay_nights(from, to),
        _ => 0,
    };
    let adults = input.adults.unwrap_or(1).max(1);
    let children = input.children.unwrap_or(0).max(0);
    let accompanying = normalize_guest_drafts(&input.accompanying_guests);

    let mut room_ids = input.room_ids.clone();
    room_ids.sort_unstable();
    room_ids.dedup();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    queries::get_customer(&tx, input.customer_id)?.ok_or(AppError::MissingCustomer)?;
    for room_id in &room_ids {
        if queries::get_room(&tx, *room_id)?.is_none() {
            return Err(AppError::Validation(format!("room {room_id} does not exist")));
        }
    }

    let mut booking_id = None;
    for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
        let reference = tokens::generate_booking_reference()?;
        let record = NewBookingRecord {
            customer_id: input.customer_id,
            reference_code: &reference,
            check_in_date,
            check_out_date,
            adults,
            children,
            accompanying_guests: &accompanying,
        };
        match queries::insert_booking(&tx, &record) {
            Ok(id) => {
                booking_id = Some(id);
                break;
            }
            Err(e) if queries::is_unique_violation(&e) => {
                tracing::warn!(attempt, "booking reference collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let booking_id = booking_id.ok_or(AppError::CodeGenerationExhausted)?;

    for room_id in &room_ids {
        queries::insert_booking_room(&tx, booking_id, *room_id, nights)?;
        queries::set_room_status(&tx, *room_id, RoomAssignmentStatus::Reserved.as_str())?;
    }

    let details = queries::get_booking_details(&tx, booking_id)?.ok_or(AppError::BookingNotFound)?;
    tx.commit()?;

    tracing::info!(booking_id, rooms = room_ids.len(), "booking created");
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use crate::services::testing::test_conn;

    fn fixtures(conn: &Connection) -> (i64, i64, i64) {
        let customer_id = queries::create_customer(conn, "Jane Doe", "jane@example.com").unwrap();
        let a = queries::create_room(conn, "201", "Twin").unwrap();
        let b = queries::create_room(conn, "202", "Suite").unwrap();
        (customer_id, a, b)
    }

    #[test]
    fn test_create_booking_reserves_rooms() {
        let mut conn = test_conn();
        let (customer_id, a, b) = fixtures(&conn);

        let details = create_booking(
            &mut conn,
            &NewBooking {
                customer_id,
                room_ids: vec![a, b],
                check_in_date: Some("2025-06-01".to_string()),
                check_out_date: Some("2025-06-03T11:00:00Z".to_string()),
                adults: Some(2),
                children: Some(1),
                accompanying_guests: vec![
                    GuestDraft {
                        name: Some("John Doe".to_string()),
                        guest_type: None,
                    },
                    GuestDraft {
                        name: Some("  ".to_string()),
                        guest_type: Some("Child".to_string()),
                    },
                ],
                ..Default::default()
            },
        )
        .unwrap();

        let booking = &details.booking;
        assert!(booking.reference_code.starts_with("BK-"));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.number_of_guests, 3);
        assert_eq!(booking.nights(), 2);
        assert_eq!(
            booking.accompanying_guests,
            vec![AccompanyingGuest {
                full_name: "John Doe".to_string(),
                guest_type: "Adult".to_string(),
            }]
        );
        assert_eq!(details.rooms.len(), 2);
        assert!(details.rooms.iter().all(|r| r.nights == 2 && r.room.status == "Reserved"));
    }

    #[test]
    fn test_create_booking_validation() {
        let mut conn = test_conn();
        let (customer_id, a, _) = fixtures(&conn);

        let err = create_booking(&mut conn, &NewBooking { customer_id, ..Default::default() }).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = create_booking(
            &mut conn,
            &NewBooking {
                customer_id: 999,
                room_ids: vec![a],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingCustomer));

        let err = create_booking(
            &mut conn,
            &NewBooking {
                customer_id,
                room_ids: vec![a, 999],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = create_booking(
            &mut conn,
            &NewBooking {
                customer_id,
                room_ids: vec![a],
                check_in_date: Some("2025-06-05".to_string()),
                check_out_date: Some("2025-06-01".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_stay_date() {
        assert_eq!(parse_stay_date("2025-06-01"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(
            parse_stay_date("2025-06-01T23:00:00+00:00"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(parse_stay_date("01/06/2025"), None);
    }
}
