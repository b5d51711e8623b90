use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::models::{
    AccompanyingGuest, Booking, BookingDetails, BookingInfo, BookingRoom, BookingStatus, Consent,
    ConsentLog, ConsentLogStatus, Customer, DeliveryStatus, Guest, NewGuest, Room,
    RoomAssignmentStatus, SessionStatus,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_optional_timestamp(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok())
}

fn parse_optional_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
}

fn is_missing_row<T>(result: rusqlite::Result<T>) -> rusqlite::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// True when the error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// ── Customers ──

pub fn create_customer(conn: &Connection, full_name: &str, email: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO customers (full_name, email) VALUES (?1, ?2)",
        params![full_name, email],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_customer(conn: &Connection, id: i64) -> rusqlite::Result<Option<Customer>> {
    is_missing_row(conn.query_row(
        "SELECT id, full_name, email FROM customers WHERE id = ?1 AND deleted_at IS NULL",
        params![id],
        |row| {
            Ok(Customer {
                id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
            })
        },
    ))
}

// ── Rooms ──

pub fn create_room(conn: &Connection, room_number: &str, room_type: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO rooms (room_number, room_type) VALUES (?1, ?2)",
        params![room_number, room_type],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_room(conn: &Connection, id: i64) -> rusqlite::Result<Option<Room>> {
    is_missing_row(conn.query_row(
        "SELECT id, room_number, room_type, status FROM rooms WHERE id = ?1 AND deleted_at IS NULL",
        params![id],
        |row| {
            Ok(Room {
                id: row.get(0)?,
                room_number: row.get(1)?,
                room_type: row.get(2)?,
                status: row.get(3)?,
            })
        },
    ))
}

pub fn set_room_status(conn: &Connection, id: i64, status: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE rooms SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;
    Ok(())
}

// ── Bookings ──

pub struct NewBookingRecord<'a> {
    pub customer_id: i64,
    pub reference_code: &'a str,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub adults: i64,
    pub children: i64,
    pub accompanying_guests: &'a [AccompanyingGuest],
}

pub fn insert_booking(conn: &Connection, record: &NewBookingRecord<'_>) -> rusqlite::Result<i64> {
    let accompanying = serde_json::to_string(record.accompanying_guests)
        .unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO bookings (customer_id, reference_code, status, check_in_date, check_out_date,
                               number_of_guests, adults, children, accompanying_guests)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.customer_id,
            record.reference_code,
            BookingStatus::Confirmed.as_str(),
            record.check_in_date.map(|d| d.format(DATE_FORMAT).to_string()),
            record.check_out_date.map(|d| d.format(DATE_FORMAT).to_string()),
            record.adults + record.children,
            record.adults,
            record.children,
            accompanying,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_booking_room(
    conn: &Connection,
    booking_id: i64,
    room_id: i64,
    nights: i64,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO booking_rooms (booking_id, room_id, nights, status) VALUES (?1, ?2, ?3, ?4)",
        params![
            booking_id,
            room_id,
            nights,
            RoomAssignmentStatus::Reserved.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const BOOKING_COLUMNS: &str = "id, customer_id, reference_code, status, check_in_date, check_out_date,
     check_in, check_out, checked_in_at, checkin_completed, number_of_guests, adults, children,
     accompanying_guests, created_at, updated_at";

fn parse_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    let status_str: String = row.get(3)?;
    let accompanying_json: String = row.get(13)?;
    let created_at_str: String = row.get(14)?;
    let updated_at_str: String = row.get(15)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        reference_code: row.get(2)?,
        status: BookingStatus::parse(&status_str),
        check_in_date: parse_optional_date(row.get(4)?),
        check_out_date: parse_optional_date(row.get(5)?),
        check_in: parse_optional_timestamp(row.get(6)?),
        check_out: parse_optional_timestamp(row.get(7)?),
        checked_in_at: parse_optional_timestamp(row.get(8)?),
        checkin_completed: row.get::<_, i32>(9)? != 0,
        number_of_guests: row.get(10)?,
        adults: row.get(11)?,
        children: row.get(12)?,
        accompanying_guests: serde_json::from_str(&accompanying_json).unwrap_or_default(),
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

pub fn get_booking(conn: &Connection, id: i64) -> rusqlite::Result<Option<Booking>> {
    is_missing_row(conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        parse_booking_row,
    ))
}

pub fn get_booking_rooms(conn: &Connection, booking_id: i64) -> rusqlite::Result<Vec<BookingRoom>> {
    let mut stmt = conn.prepare(
        "SELECT br.id, br.booking_id, br.nights, br.hours, br.status,
                r.id, r.room_number, r.room_type, r.status
         FROM booking_rooms br
         JOIN rooms r ON r.id = br.room_id
         WHERE br.booking_id = ?1 AND br.deleted_at IS NULL
         ORDER BY br.id ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        let status: String = row.get(4)?;
        Ok(BookingRoom {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            nights: row.get(2)?,
            hours: row.get(3)?,
            status: RoomAssignmentStatus::parse(&status),
            room: Room {
                id: row.get(5)?,
                room_number: row.get(6)?,
                room_type: row.get(7)?,
                status: row.get(8)?,
            },
        })
    })?;

    let mut rooms = vec![];
    for row in rows {
        rooms.push(row?);
    }
    Ok(rooms)
}

pub fn get_booking_details(conn: &Connection, id: i64) -> rusqlite::Result<Option<BookingDetails>> {
    let Some(booking) = get_booking(conn, id)? else {
        return Ok(None);
    };
    let customer = get_customer(conn, booking.customer_id)?;
    let rooms = get_booking_rooms(conn, booking.id)?;
    Ok(Some(BookingDetails {
        booking,
        customer,
        rooms,
    }))
}

pub fn mark_booking_checked_in(
    conn: &Connection,
    id: i64,
    now: &NaiveDateTime,
    guest_count: i64,
) -> rusqlite::Result<()> {
    let now = format_timestamp(now);
    conn.execute(
        "UPDATE bookings
         SET status = ?1, check_in = ?2, checked_in_at = ?2, checkin_completed = 1,
             number_of_guests = ?3, updated_at = ?2
         WHERE id = ?4",
        params![BookingStatus::CheckedIn.as_str(), now, guest_count, id],
    )?;
    Ok(())
}

pub fn mark_booking_checked_out(conn: &Connection, id: i64, now: &NaiveDateTime) -> rusqlite::Result<()> {
    let now = format_timestamp(now);
    conn.execute(
        "UPDATE bookings SET status = ?1, check_out = ?2, updated_at = ?2 WHERE id = ?3",
        params![BookingStatus::CheckedOut.as_str(), now, id],
    )?;
    Ok(())
}

/// Frees every room assigned to the booking, both the assignment rows and the rooms.
pub fn release_booking_rooms(conn: &Connection, booking_id: i64) -> rusqlite::Result<usize> {
    let available = RoomAssignmentStatus::Available.as_str();
    conn.execute(
        "UPDATE rooms SET status = ?1
         WHERE id IN (SELECT room_id FROM booking_rooms WHERE booking_id = ?2 AND deleted_at IS NULL)",
        params![available, booking_id],
    )?;
    let count = conn.execute(
        "UPDATE booking_rooms SET status = ?1 WHERE booking_id = ?2 AND deleted_at IS NULL",
        params![available, booking_id],
    )?;
    Ok(count)
}

// ── Check-in Sessions ──

pub struct NewSession<'a> {
    pub booking_id: i64,
    pub token: &'a str,
    pub checkin_code: &'a str,
    pub expires_at: Option<NaiveDateTime>,
    pub code_expires_at: Option<NaiveDateTime>,
    pub guest_email: &'a str,
    pub guest_last_name: &'a str,
}

pub fn insert_session(conn: &Connection, session: &NewSession<'_>) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO booking_infos (booking_id, token, checkin_code, status, email_status,
                                    expires_at, code_expires_at, guest_email, guest_last_name)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            session.booking_id,
            session.token,
            session.checkin_code,
            SessionStatus::Initiated.as_str(),
            DeliveryStatus::Pending.as_str(),
            session.expires_at.as_ref().map(format_timestamp),
            session.code_expires_at.as_ref().map(format_timestamp),
            session.guest_email,
            session.guest_last_name,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const SESSION_COLUMNS: &str = "id, booking_id, token, checkin_code, status, email_status, email_error,
     expires_at, code_expires_at, guest_email, guest_last_name, created_at";

fn parse_session_row(row: &Row) -> rusqlite::Result<BookingInfo> {
    let status: String = row.get(4)?;
    let email_status: String = row.get(5)?;
    let created_at: String = row.get(11)?;

    Ok(BookingInfo {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        token: row.get(2)?,
        checkin_code: row.get(3)?,
        status: SessionStatus::parse(&status),
        email_status: DeliveryStatus::parse(&email_status),
        email_error: row.get(6)?,
        expires_at: parse_optional_timestamp(row.get(7)?),
        code_expires_at: parse_optional_timestamp(row.get(8)?),
        guest_email: row.get(9)?,
        guest_last_name: row.get(10)?,
        created_at: parse_timestamp(&created_at),
    })
}

pub fn get_session(conn: &Connection, id: i64) -> rusqlite::Result<Option<BookingInfo>> {
    is_missing_row(conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM booking_infos WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        parse_session_row,
    ))
}

/// Latest session for the booking that is still `INITIATED` and whose token has not lapsed.
pub fn find_active_session_for_booking(
    conn: &Connection,
    booking_id: i64,
    now: &NaiveDateTime,
) -> rusqlite::Result<Option<BookingInfo>> {
    is_missing_row(conn.query_row(
        &format!(
            "SELECT {SESSION_COLUMNS} FROM booking_infos
             WHERE booking_id = ?1 AND deleted_at IS NULL AND status = ?2
               AND (expires_at IS NULL OR expires_at > ?3)
             ORDER BY id DESC LIMIT 1"
        ),
        params![
            booking_id,
            SessionStatus::Initiated.as_str(),
            format_timestamp(now)
        ],
        parse_session_row,
    ))
}

/// Exact token match, regardless of expiry.
pub fn find_session_by_token(conn: &Connection, token: &str) -> rusqlite::Result<Option<BookingInfo>> {
    is_missing_row(conn.query_row(
        &format!(
            "SELECT {SESSION_COLUMNS} FROM booking_infos WHERE token = ?1 AND deleted_at IS NULL"
        ),
        params![token],
        parse_session_row,
    ))
}

/// Code match with or without the hyphen, regardless of expiry.
pub fn find_session_by_code(
    conn: &Connection,
    formatted: &str,
    compact: &str,
) -> rusqlite::Result<Option<BookingInfo>> {
    is_missing_row(conn.query_row(
        &format!(
            "SELECT {SESSION_COLUMNS} FROM booking_infos
             WHERE (checkin_code = ?1 OR checkin_code = ?2) AND deleted_at IS NULL
             ORDER BY id DESC LIMIT 1"
        ),
        params![formatted, compact],
        parse_session_row,
    ))
}

pub fn set_session_delivery(
    conn: &Connection,
    id: i64,
    status: DeliveryStatus,
    error: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE booking_infos SET email_status = ?1, email_error = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![status.as_str(), error, id],
    )?;
    Ok(())
}

pub fn set_session_status(conn: &Connection, id: i64, status: SessionStatus) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE booking_infos SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

pub fn set_code_expiry(conn: &Connection, id: i64, expires_at: &NaiveDateTime) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE booking_infos SET code_expires_at = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![format_timestamp(expires_at), id],
    )?;
    Ok(())
}

/// Makes every session of the booking unusable: token expiry pinned to `now`, status `EXPIRED`.
pub fn expire_sessions_for_booking(
    conn: &Connection,
    booking_id: i64,
    now: &NaiveDateTime,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE booking_infos SET expires_at = ?1, status = ?2, updated_at = ?1
         WHERE booking_id = ?3 AND deleted_at IS NULL",
        params![
            format_timestamp(now),
            SessionStatus::Expired.as_str(),
            booking_id
        ],
    )
}

/// Retires the booking's `INITIATED` sessions so a new one can take their place.
pub fn expire_initiated_sessions_for_booking(
    conn: &Connection,
    booking_id: i64,
    now: &NaiveDateTime,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE booking_infos SET status = ?1, updated_at = ?2
         WHERE booking_id = ?3 AND status = ?4 AND deleted_at IS NULL",
        params![
            SessionStatus::Expired.as_str(),
            format_timestamp(now),
            booking_id,
            SessionStatus::Initiated.as_str()
        ],
    )
}

/// Marks `INITIATED` sessions whose token and code have both lapsed as `EXPIRED`.
pub fn expire_lapsed_sessions(conn: &Connection, now: &NaiveDateTime) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE booking_infos SET status = ?1, updated_at = ?2
         WHERE status = ?3 AND deleted_at IS NULL
           AND expires_at IS NOT NULL AND expires_at <= ?2
           AND code_expires_at IS NOT NULL AND code_expires_at <= ?2",
        params![
            SessionStatus::Expired.as_str(),
            format_timestamp(now),
            SessionStatus::Initiated.as_str()
        ],
    )
}

// ── Guests ──

pub fn insert_guest(conn: &Connection, booking_id: i64, guest: &NewGuest) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO guests (booking_id, full_name, is_main_guest, date_of_birth, gender, nationality,
                             current_address, id_type, id_number, id_issued_country,
                             face_image_path, document_image_path, email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking_id,
            guest.full_name.trim(),
            guest.is_main_guest as i32,
            guest.date_of_birth.map(|d| d.format(DATE_FORMAT).to_string()),
            guest.gender,
            guest.nationality,
            guest.current_address,
            guest.id_type,
            guest.id_number,
            guest.id_issued_country,
            guest.face_image_path,
            guest.document_image_path,
            guest.email,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_guests_for_booking(conn: &Connection, booking_id: i64) -> rusqlite::Result<Vec<Guest>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, full_name, is_main_guest, date_of_birth, gender, nationality,
                current_address, id_type, id_number, id_issued_country, face_image_path,
                document_image_path, email, created_at
         FROM guests WHERE booking_id = ?1
         ORDER BY is_main_guest DESC, id ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        let created_at: String = row.get(14)?;
        Ok(Guest {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            full_name: row.get(2)?,
            is_main_guest: row.get::<_, i32>(3)? != 0,
            date_of_birth: parse_optional_date(row.get(4)?),
            gender: row.get(5)?,
            nationality: row.get(6)?,
            current_address: row.get(7)?,
            id_type: row.get(8)?,
            id_number: row.get(9)?,
            id_issued_country: row.get(10)?,
            face_image_path: row.get(11)?,
            document_image_path: row.get(12)?,
            email: row.get(13)?,
            created_at: parse_timestamp(&created_at),
        })
    })?;

    let mut guests = vec![];
    for row in rows {
        guests.push(row?);
    }
    Ok(guests)
}

// ── Consents ──

pub fn create_consent(
    conn: &Connection,
    slug: &str,
    title: &str,
    description: &str,
    version: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO consents (slug, title, description, version, effective_from)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))",
        params![slug, title, description, version],
    )?;
    Ok(conn.last_insert_rowid())
}

const CONSENT_COLUMNS: &str = "id, slug, title, description, version, effective_from";

fn consent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Consent> {
    Ok(Consent {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        version: row.get(4)?,
        effective_from: parse_optional_timestamp(row.get(5)?),
    })
}

/// A template is identified by its slug together with its version.
pub fn find_consent(conn: &Connection, slug: &str, version: &str) -> rusqlite::Result<Option<Consent>> {
    is_missing_row(conn.query_row(
        &format!(
            "SELECT {CONSENT_COLUMNS} FROM consents
             WHERE slug = ?1 AND version = ?2 AND deleted_at IS NULL"
        ),
        params![slug, version],
        consent_from_row,
    ))
}

pub fn list_consents(conn: &Connection) -> rusqlite::Result<Vec<Consent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONSENT_COLUMNS} FROM consents WHERE deleted_at IS NULL ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([], consent_from_row)?;

    let mut consents = vec![];
    for row in rows {
        consents.push(row?);
    }
    Ok(consents)
}

/// Returns the ids from `ids` that do not name a live consent template.
pub fn unknown_consent_ids(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<i64>> {
    let mut missing = vec![];
    for id in ids {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM consents WHERE id = ?1 AND deleted_at IS NULL",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            missing.push(*id);
        }
    }
    Ok(missing)
}

pub struct NewConsentLog<'a> {
    pub booking_id: Option<i64>,
    pub booking_token: Option<&'a str>,
    pub consent_id: i64,
    pub guest_id: Option<i64>,
    pub accepted_at: NaiveDateTime,
    pub accepted_by: &'a str,
    pub status: ConsentLogStatus,
    pub action: &'a str,
}

pub fn insert_consent_log(conn: &Connection, log: &NewConsentLog<'_>) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO consent_logs (booking_id, booking_token, consent_id, guest_id, accepted_at,
                                   accepted_by, status, action)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            log.booking_id,
            log.booking_token,
            log.consent_id,
            log.guest_id,
            format_timestamp(&log.accepted_at),
            log.accepted_by,
            log.status.as_str(),
            log.action,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_consent_logs(conn: &Connection, booking_id: Option<i64>) -> rusqlite::Result<Vec<ConsentLog>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, booking_token, consent_id, guest_id, accepted_at, accepted_by,
                status, action
         FROM consent_logs
         WHERE deleted_at IS NULL AND (?1 IS NULL OR booking_id = ?1)
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        let accepted_at: String = row.get(5)?;
        let status: String = row.get(7)?;
        Ok(ConsentLog {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            booking_token: row.get(2)?,
            consent_id: row.get(3)?,
            guest_id: row.get(4)?,
            accepted_at: parse_timestamp(&accepted_at),
            accepted_by: row.get(6)?,
            status: ConsentLogStatus::parse(&status),
            action: row.get(8)?,
        })
    })?;

    let mut logs = vec![];
    for row in rows {
        logs.push(row?);
    }
    Ok(logs)
}

/// Links unassigned consent logs matching any of `guest_ids` or the given token to `booking_id`.
pub fn link_pending_consent_logs(
    conn: &Connection,
    booking_id: i64,
    guest_ids: &[i64],
    token: Option<&str>,
    now: &NaiveDateTime,
) -> rusqlite::Result<usize> {
    let mut matchers = vec![];
    let mut values: Vec<rusqlite::types::Value> = vec![
        booking_id.into(),
        ConsentLogStatus::Sent.as_str().to_string().into(),
        format_timestamp(now).into(),
    ];

    if !guest_ids.is_empty() {
        let first = values.len() + 1;
        let placeholders: Vec<String> = (0..guest_ids.len())
            .map(|i| format!("?{}", first + i))
            .collect();
        matchers.push(format!("guest_id IN ({})", placeholders.join(", ")));
        values.extend(guest_ids.iter().map(|id| rusqlite::types::Value::from(*id)));
    }
    if let Some(token) = token {
        matchers.push(format!("booking_token = ?{}", values.len() + 1));
        values.push(token.to_string().into());
    }
    if matchers.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE consent_logs SET booking_id = ?1, status = ?2, updated_at = ?3
         WHERE booking_id IS NULL AND deleted_at IS NULL AND ({})",
        matchers.join(" OR ")
    );
    conn.execute(&sql, params_from_iter(values))
}
