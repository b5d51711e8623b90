//! Fixtures shared by the service unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::services::tokens;

pub fn test_conn() -> Connection {
    db::init_db(":memory:").unwrap()
}

pub fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// A confirmed 2025-06-01..04 booking for a new customer with `rooms` fresh rooms.
pub fn seed_booking(conn: &Connection, name: &str, email: &str, rooms: usize) -> i64 {
    let customer_id = queries::create_customer(conn, name, email).unwrap();
    let reference = tokens::generate_booking_reference().unwrap();
    let booking_id = queries::insert_booking(
        conn,
        &queries::NewBookingRecord {
            customer_id,
            reference_code: &reference,
            check_in_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            check_out_date: NaiveDate::from_ymd_opt(2025, 6, 4),
            adults: 2,
            children: 0,
            accompanying_guests: &[],
        },
    )
    .unwrap();

    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
        .unwrap();
    for i in 0..rooms {
        let number = format!("{}", 100 + existing + i as i64 + 1);
        let room_id = queries::create_room(conn, &number, "Deluxe").unwrap();
        queries::insert_booking_room(conn, booking_id, room_id, 3).unwrap();
        queries::set_room_status(conn, room_id, "Reserved").unwrap();
    }
    booking_id
}
