//! Check-in sessions: creation, validation by code or token, resend and expiry.
//!
//! A booking has at most one active session. A session is active while it is
//! `INITIATED` and its token has not lapsed.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};

use crate::config::CheckinSettings;
use crate::db::queries::{self, NewSession};
use crate::errors::AppError;
use crate::models::{BookingDetails, BookingInfo, BookingStatus, DeliveryStatus, SessionStatus};
use crate::services::notify::{build_checkin_link, CheckinNotice, CheckinNotifier, RoomLine};
use crate::services::tokens;
use crate::state::{lock_db, AppState};

const MAX_CREDENTIAL_ATTEMPTS: usize = 5;

/// Outcome of the notification attempt that follows session creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
}

#[derive(Debug)]
pub struct Initiated {
    pub session: BookingInfo,
    pub delivery: Delivery,
}

/// A session resolved from its token together with the booking it unlocks.
#[derive(Debug)]
pub struct TokenView {
    pub session: BookingInfo,
    pub details: BookingDetails,
    pub nights: i64,
}

#[derive(Debug, Clone)]
pub enum SessionLookup {
    Id(i64),
    Code(String),
}

/// Creates a session for the booking inside an immediate transaction.
///
/// Returns the stored session and the notice to deliver; nothing is sent here.
pub fn create_session(
    conn: &mut Connection,
    booking_id: i64,
    settings: &CheckinSettings,
    now: NaiveDateTime,
) -> Result<(BookingInfo, CheckinNotice), AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let details = queries::get_booking_details(&tx, booking_id)?.ok_or(AppError::BookingNotFound)?;
    let customer = details.customer.as_ref().ok_or(AppError::MissingCustomer)?;
    if details.rooms.is_empty() {
        return Err(AppError::MissingRoom);
    }
    let email = customer.email.trim();
    if email.is_empty() {
        return Err(AppError::MissingContactEmail);
    }
    if details.booking.status == BookingStatus::CheckedOut {
        return Err(AppError::BookingAlreadyCheckedOut);
    }
    if details.booking.is_checked_in() || details.booking.status == BookingStatus::CheckedIn {
        return Err(AppError::AlreadyCheckedIn);
    }

    if let Some(active) = queries::find_active_session_for_booking(&tx, booking_id, &now)? {
        tracing::info!(booking_id, session_id = active.id, "check-in already initiated");
        return Err(AppError::CheckinAlreadyInitiated);
    }

    // Sessions whose token lapsed may still carry a live code; only the new one may be usable.
    let retired = queries::expire_initiated_sessions_for_booking(&tx, booking_id, &now)?;
    if retired > 0 {
        tracing::info!(booking_id, retired, "retired lapsed check-in sessions");
    }

    let expires_at = Some(now + settings.token_ttl);
    let code_expires_at = settings.code_ttl.map(|ttl| now + ttl);
    let last_name = last_name(&customer.full_name);

    let mut session_id = None;
    for attempt in 1..=MAX_CREDENTIAL_ATTEMPTS {
        let token = tokens::generate_token()?;
        let code = tokens::generate_checkin_code()?;
        let new_session = NewSession {
            booking_id,
            token: &token,
            checkin_code: &code,
            expires_at,
            code_expires_at,
            guest_email: email,
            guest_last_name: &last_name,
        };
        match queries::insert_session(&tx, &new_session) {
            Ok(id) => {
                session_id = Some(id);
                break;
            }
            Err(e) if queries::is_unique_violation(&e) => {
                tracing::warn!(booking_id, attempt, "check-in credential collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let session_id = session_id.ok_or(AppError::CodeGenerationExhausted)?;

    let session = queries::get_session(&tx, session_id)?.ok_or(AppError::SessionNotFound)?;
    tx.commit()?;

    tracing::info!(booking_id, session_id, "check-in session created");
    let notice = build_notice(&details, &session, &settings.frontend_url);
    Ok((session, notice))
}

/// Creates a session and delivers the invitation. A failed delivery still
/// returns the session, with the failure recorded on it.
pub async fn initiate(state: &AppState, booking_id: i64) -> Result<Initiated, AppError> {
    let settings = state.config.checkin_settings();
    let (mut session, notice) = {
        let mut conn = state.conn()?;
        create_session(&mut conn, booking_id, &settings, Utc::now().naive_utc())?
    };

    let delivery = match state.notifier.send_checkin_link(&notice).await {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            tracing::warn!(booking_id, session_id = session.id, error = %e, "check-in email failed");
            Delivery::Failed(e.to_string())
        }
    };

    let (status, error) = match &delivery {
        Delivery::Sent => (DeliveryStatus::Sent, String::new()),
        Delivery::Failed(e) => (DeliveryStatus::Failed, e.clone()),
    };
    record_delivery(&state.db, session.id, status, &error);
    session.email_status = status;
    session.email_error = error;

    Ok(Initiated { session, delivery })
}

fn record_delivery(db: &Mutex<Connection>, session_id: i64, status: DeliveryStatus, error: &str) {
    let result = lock_db(db).and_then(|conn| {
        queries::set_session_delivery(&conn, session_id, status, error).map_err(AppError::from)
    });
    if let Err(e) = result {
        tracing::error!(session_id, error = %e, "failed to record delivery status");
    }
}

/// Resolves a code plus disambiguator (customer name fragment or booking reference) to its session.
pub fn validate_by_code(
    conn: &Connection,
    code: &str,
    query: &str,
    now: NaiveDateTime,
) -> Result<BookingInfo, AppError> {
    let formatted = tokens::parse_code(code).ok_or(AppError::InvalidFormat)?;
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation(
            "query (last name or booking reference) is required".to_string(),
        ));
    }

    let compact = tokens::normalize_code(&formatted);
    let Some(session) = queries::find_session_by_code(conn, &formatted, &compact)? else {
        tracing::info!("check-in code not found");
        return Err(AppError::InvalidOrExpiredCode);
    };

    let Some(details) = queries::get_booking_details(conn, session.booking_id)? else {
        tracing::warn!(session_id = session.id, "check-in code points at a missing booking");
        return Err(AppError::InvalidOrExpiredCode);
    };
    if !matches_disambiguator(&details, query) {
        tracing::info!(session_id = session.id, "check-in code disambiguator mismatch");
        return Err(AppError::InvalidOrExpiredCode);
    }
    if details.booking.status == BookingStatus::CheckedOut {
        return Err(AppError::BookingCheckedOut);
    }
    if session.status == SessionStatus::Expired || !session.code_valid_at(now) {
        tracing::info!(session_id = session.id, "check-in code expired");
        return Err(AppError::InvalidOrExpiredCode);
    }

    Ok(session)
}

fn matches_disambiguator(details: &BookingDetails, query: &str) -> bool {
    if details.booking.reference_code.eq_ignore_ascii_case(query) {
        return true;
    }
    details
        .customer
        .as_ref()
        .is_some_and(|c| c.full_name.to_lowercase().contains(&query.to_lowercase()))
}

/// Resolves a link token to its session and booking.
///
/// A checked-out booking is reported as such even though checkout pinned the
/// token's expiry, so the lookup itself ignores expiry.
pub fn validate_by_token(
    conn: &Connection,
    token: &str,
    now: NaiveDateTime,
) -> Result<TokenView, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidOrExpiredToken);
    }
    let session = queries::find_session_by_token(conn, token)?.ok_or(AppError::InvalidOrExpiredToken)?;
    let details = queries::get_booking_details(conn, session.booking_id)?.ok_or(AppError::BookingNotFound)?;

    if details.booking.status == BookingStatus::CheckedOut {
        return Err(AppError::BookingCheckedOut);
    }
    if session.status == SessionStatus::Expired || !session.token_valid_at(now) {
        return Err(AppError::InvalidOrExpiredToken);
    }

    let nights = details.booking.nights();
    Ok(TokenView {
        session,
        details,
        nights,
    })
}

/// Pushes the code expiry to `now + extension`. Returns the updated session and
/// the notice to re-send.
pub fn extend_code_expiry(
    conn: &Connection,
    lookup: &SessionLookup,
    settings: &CheckinSettings,
    now: NaiveDateTime,
) -> Result<(BookingInfo, CheckinNotice), AppError> {
    let session = match lookup {
        SessionLookup::Id(id) => queries::get_session(conn, *id)?,
        SessionLookup::Code(code) => {
            let formatted = tokens::parse_code(code).ok_or(AppError::InvalidFormat)?;
            queries::find_session_by_code(conn, &formatted, &tokens::normalize_code(&formatted))?
        }
    };
    let mut session = session.ok_or(AppError::SessionNotFound)?;
    if matches!(session.status, SessionStatus::Expired | SessionStatus::Completed) {
        return Err(AppError::SessionNotFound);
    }

    let details = queries::get_booking_details(conn, session.booking_id)?.ok_or(AppError::BookingNotFound)?;
    if details.booking.status == BookingStatus::CheckedOut {
        return Err(AppError::BookingCheckedOut);
    }

    let expires_at = now + settings.resend_extension;
    queries::set_code_expiry(conn, session.id, &expires_at)?;
    session.code_expires_at = Some(expires_at);

    let notice = build_notice(&details, &session, &settings.frontend_url);
    Ok((session, notice))
}

/// Extends the code and re-sends the invitation in the background. Delivery
/// failures are logged and recorded on the session, never returned.
pub fn resend(state: &AppState, lookup: &SessionLookup) -> Result<BookingInfo, AppError> {
    let settings = state.config.checkin_settings();
    let (session, notice) = {
        let conn = state.conn()?;
        extend_code_expiry(&conn, lookup, &settings, Utc::now().naive_utc())?
    };

    spawn_delivery(
        Arc::clone(&state.db),
        Arc::clone(&state.notifier),
        session.id,
        notice,
    );
    Ok(session)
}

fn spawn_delivery(
    db: Arc<Mutex<Connection>>,
    notifier: Arc<dyn CheckinNotifier>,
    session_id: i64,
    notice: CheckinNotice,
) {
    tokio::spawn(async move {
        match notifier.send_checkin_link(&notice).await {
            Ok(()) => {
                tracing::info!(session_id, "check-in code re-sent");
                record_delivery(&db, session_id, DeliveryStatus::Sent, "");
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "re-sending check-in code failed");
                record_delivery(&db, session_id, DeliveryStatus::Failed, &e.to_string());
            }
        }
    });
}

/// Marks lapsed sessions `EXPIRED`. Validation never relies on this.
pub fn sweep_expired(conn: &Connection, now: NaiveDateTime) -> Result<usize, AppError> {
    let expired = queries::expire_lapsed_sessions(conn, &now)?;
    if expired > 0 {
        tracing::info!(expired, "expired lapsed check-in sessions");
    }
    Ok(expired)
}

fn build_notice(details: &BookingDetails, session: &BookingInfo, frontend_url: &str) -> CheckinNotice {
    let guest_name = details
        .customer
        .as_ref()
        .map(|c| c.full_name.clone())
        .unwrap_or_else(|| session.guest_last_name.clone());
    let date_or_na = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    };

    CheckinNotice {
        recipient: session.guest_email.clone(),
        booking_ref: details.booking.reference_code.clone(),
        link: build_checkin_link(frontend_url, &session.token),
        guest_name,
        rooms: details
            .rooms
            .iter()
            .map(|r| RoomLine {
                number: r.room.room_number.clone(),
                room_type: r.room.room_type.clone(),
            })
            .collect(),
        check_in_date: date_or_na(details.booking.check_in_date),
        check_out_date: date_or_na(details.booking.check_out_date),
        code: session.checkin_code.clone(),
    }
}

fn last_name(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string()
}
