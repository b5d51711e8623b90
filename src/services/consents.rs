//! Consent templates and acceptances recorded outside finalization, including
//! acceptances captured before the booking is known.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries::{self, NewConsentLog};
use crate::errors::AppError;
use crate::models::{Consent, ConsentLog, ConsentLogStatus};

#[derive(Debug, Deserialize)]
pub struct NewConsent {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentAcceptance {
    pub booking_id: Option<i64>,
    pub booking_token: Option<String>,
    pub consent_id: i64,
    pub guest_id: Option<i64>,
    pub accepted_at: Option<String>,
    pub accepted_by: String,
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachRequest {
    pub booking_id: Option<i64>,
    pub token: Option<String>,
    pub guest_ids: Vec<i64>,
}

const DEFAULT_TEMPLATE_VERSION: &str = "1.0";

/// Returns the template for `(slug, version)`, creating it first if needed.
/// The flag tells whether a new row was written.
pub fn create_template(conn: &Connection, input: &NewConsent) -> Result<(Consent, bool), AppError> {
    let slug = input.slug.trim();
    let title = input.title.trim();
    if slug.is_empty() || title.is_empty() {
        return Err(AppError::Validation("slug and title are required".to_string()));
    }
    let version = input
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE_VERSION);

    if let Some(existing) = queries::find_consent(conn, slug, version)? {
        return Ok((existing, false));
    }

    match queries::create_consent(conn, slug, title, input.description.trim(), version) {
        Ok(id) => tracing::info!(consent_id = id, slug, version, "consent template created"),
        // Lost a race against an identical request; the row exists now.
        Err(e) if queries::is_unique_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }

    let consent = queries::find_consent(conn, slug, version)?.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("consent {slug} v{version} vanished after insert"))
    })?;
    Ok((consent, true))
}

/// Stores one acceptance. Without a booking id it stays `pending` until attached.
pub fn record_acceptance(
    conn: &Connection,
    input: &ConsentAcceptance,
    now: NaiveDateTime,
) -> Result<i64, AppError> {
    if !queries::unknown_consent_ids(conn, &[input.consent_id])?.is_empty() {
        return Err(AppError::Validation(format!("unknown consent id {}", input.consent_id)));
    }

    let booking_id = input.booking_id.filter(|id| *id > 0);
    if let Some(id) = booking_id {
        queries::get_booking(conn, id)?.ok_or(AppError::BookingNotFound)?;
    }
    let status = if booking_id.is_some() {
        ConsentLogStatus::Sent
    } else {
        ConsentLogStatus::Pending
    };

    let accepted_at = match input.accepted_at.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_accepted_at(raw).unwrap_or_else(|| {
            tracing::warn!(accepted_at = raw, "unparseable acceptance time, using now");
            now
        }),
        None => now,
    };
    let token = input.booking_token.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let id = queries::insert_consent_log(
        conn,
        &NewConsentLog {
            booking_id,
            booking_token: token,
            consent_id: input.consent_id,
            guest_id: input.guest_id,
            accepted_at,
            accepted_by: input.accepted_by.trim(),
            status,
            action: input.action.trim(),
        },
    )?;
    tracing::info!(consent_log_id = id, status = status.as_str(), "consent acceptance recorded");
    Ok(id)
}

fn parse_accepted_at(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Links pending acceptances to a booking.
///
/// The booking comes from `bookingId`, or else from the session the token
/// belongs to; if both are given they must agree. Rows are matched by any
/// listed guest id or by the token.
pub fn attach_booking(
    conn: &Connection,
    request: &AttachRequest,
    now: NaiveDateTime,
) -> Result<(i64, usize), AppError> {
    let token = request.token.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let from_token = match token {
        Some(token) => Some(
            queries::find_session_by_token(conn, token)?
                .ok_or(AppError::SessionNotFound)?
                .booking_id,
        ),
        None => None,
    };

    let booking_id = match (request.booking_id, from_token) {
        (Some(explicit), Some(resolved)) if explicit != resolved => {
            return Err(AppError::Validation(
                "bookingId does not match the booking of the given token".to_string(),
            ));
        }
        (Some(explicit), _) => explicit,
        (None, Some(resolved)) => resolved,
        (None, None) => {
            return Err(AppError::Validation("bookingId or token is required".to_string()));
        }
    };
    queries::get_booking(conn, booking_id)?.ok_or(AppError::BookingNotFound)?;

    if request.guest_ids.is_empty() && token.is_none() {
        return Err(AppError::Validation("guestIds or token is required".to_string()));
    }

    let linked = queries::link_pending_consent_logs(conn, booking_id, &request.guest_ids, token, &now)?;
    tracing::info!(booking_id, linked, "pending consent acceptances attached");
    Ok((booking_id, linked))
}

pub fn list_logs(conn: &Connection, booking_id: Option<i64>) -> Result<Vec<ConsentLog>, AppError> {
    Ok(queries::get_consent_logs(conn, booking_id)?)
}
