use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::BookingStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub booking_id: i64,
    pub checked_out_at: NaiveDateTime,
    pub sessions_expired: usize,
    pub rooms_released: usize,
}

/// Checks a booking out, kills its check-in sessions and frees its rooms in one transaction.
pub fn checkout(
    conn: &mut Connection,
    booking_id: i64,
    now: NaiveDateTime,
) -> Result<CheckoutOutcome, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let booking = queries::get_booking(&tx, booking_id)?.ok_or(AppError::BookingNotFound)?;
    if booking.status != BookingStatus::CheckedIn {
        return Err(AppError::NotCheckedIn);
    }

    queries::mark_booking_checked_out(&tx, booking_id, &now)?;
    let sessions_expired = queries::expire_sessions_for_booking(&tx, booking_id, &now)?;
    let rooms_released = queries::release_booking_rooms(&tx, booking_id)?;
    tx.commit()?;

    tracing::info!(booking_id, sessions_expired, rooms_released, "booking checked out");
    Ok(CheckoutOutcome {
        booking_id,
        checked_out_at: now,
        sessions_expired,
        rooms_released,
    })
}
