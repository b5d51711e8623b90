//! Atomic, idempotent check-in finalization.

use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries::{self, NewConsentLog};
use crate::errors::AppError;
use crate::models::{ConsentLogStatus, NewGuest, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Completed { booking_id: i64, guest_ids: Vec<i64> },
    /// The session or booking was already finalized; nothing was written.
    AlreadyCompleted { booking_id: i64 },
}

/// Records the guests and their consent acceptances and marks the booking
/// checked in, all in one immediate transaction.
///
/// The token is resolved before the guest list is looked at, so an unknown
/// token is always `InvalidOrExpiredToken`. Only that and payload validation
/// errors are reported as such; every other failure becomes `FinalizeFailed`
/// and leaves no writes behind.
pub fn finalize_checkin(
    conn: &mut Connection,
    token: &str,
    guests: &[NewGuest],
    consent_ids: &[i64],
    now: NaiveDateTime,
) -> Result<FinalizeOutcome, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidOrExpiredToken);
    }

    let mut consent_ids = consent_ids.to_vec();
    consent_ids.sort_unstable();
    consent_ids.dedup();

    commit_checkin(conn, token, guests, &consent_ids, now).map_err(|e| match e {
        AppError::InvalidOrExpiredToken | AppError::Validation(_) => e,
        other => {
            tracing::error!(error = %other, "check-in finalization failed");
            AppError::FinalizeFailed(other.to_string())
        }
    })
}

fn validate_guests(guests: &[NewGuest]) -> Result<(), AppError> {
    if guests.is_empty() {
        return Err(AppError::Validation("at least one guest is required".to_string()));
    }
    if let Some(pos) = guests.iter().position(|g| g.full_name.trim().is_empty()) {
        return Err(AppError::Validation(format!("guests[{pos}].fullName is required")));
    }
    Ok(())
}

fn commit_checkin(
    conn: &mut Connection,
    token: &str,
    guests: &[NewGuest],
    consent_ids: &[i64],
    now: NaiveDateTime,
) -> Result<FinalizeOutcome, AppError> {
    // The immediate transaction takes the write lock before anything is read.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let session = queries::find_session_by_token(&tx, token)?
        .filter(|s| s.status != SessionStatus::Expired && s.token_valid_at(now))
        .ok_or(AppError::InvalidOrExpiredToken)?;
    let booking_id = session.booking_id;
    validate_guests(guests)?;

    if session.status == SessionStatus::Completed {
        tracing::info!(booking_id, session_id = session.id, "check-in already completed");
        return Ok(FinalizeOutcome::AlreadyCompleted { booking_id });
    }

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::FinalizeFailed(format!("booking {booking_id} missing")))?;
    if booking.is_checked_in() {
        tracing::info!(booking_id, session_id = session.id, "booking already checked in");
        return Ok(FinalizeOutcome::AlreadyCompleted { booking_id });
    }

    let unknown = queries::unknown_consent_ids(&tx, consent_ids)?;
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!("unknown consent ids: {unknown:?}")));
    }

    queries::mark_booking_checked_in(&tx, booking_id, &now, guests.len() as i64)?;

    let mut guest_ids = Vec::with_capacity(guests.len());
    for guest in guests {
        let guest_id = queries::insert_guest(&tx, booking_id, guest)?;
        for consent_id in consent_ids {
            queries::insert_consent_log(
                &tx,
                &NewConsentLog {
                    booking_id: Some(booking_id),
                    booking_token: Some(token),
                    consent_id: *consent_id,
                    guest_id: Some(guest_id),
                    accepted_at: now,
                    accepted_by: guest.full_name.trim(),
                    status: ConsentLogStatus::Accepted,
                    action: "accepted",
                },
            )?;
        }
        guest_ids.push(guest_id);
    }

    queries::set_session_status(&tx, session.id, SessionStatus::Completed)?;
    tx.commit()?;

    tracing::info!(
        booking_id,
        session_id = session.id,
        guests = guest_ids.len(),
        consents = consent_ids.len(),
        "check-in finalized"
    );
    Ok(FinalizeOutcome::Completed {
        booking_id,
        guest_ids,
    })
}
