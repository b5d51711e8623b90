use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::check_auth;
use super::checkin::initiated_response;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingDetails, Customer, Guest, Room};
use crate::services::bookings::{self, NewBooking};
use crate::services::checkout::CheckoutOutcome;
use crate::services::sessions;
use crate::state::AppState;

// POST /customers
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    full_name: String,
    #[serde(default)]
    email: String,
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("fullName is required".to_string()));
    }

    let conn = state.conn()?;
    let id = queries::create_customer(&conn, full_name, req.email.trim())?;
    let customer = queries::get_customer(&conn, id)?.ok_or(AppError::MissingCustomer)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

// POST /rooms
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    room_number: String,
    #[serde(default)]
    room_type: String,
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewRoom>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let number = req.room_number.trim();
    if number.is_empty() {
        return Err(AppError::Validation("roomNumber is required".to_string()));
    }

    let conn = state.conn()?;
    let id = queries::create_room(&conn, number, req.room_type.trim()).map_err(|e| {
        if queries::is_unique_violation(&e) {
            AppError::Validation(format!("room {number} already exists"))
        } else {
            e.into()
        }
    })?;
    let room = queries::get_room(&conn, id)?.ok_or(AppError::MissingRoom)?;
    Ok((StatusCode::CREATED, Json(room)))
}

// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let details = {
        let mut conn = state.conn()?;
        bookings::create_booking(&mut conn, &req)?
    };
    let booking_id = details.booking.id;
    let mut body = json!({ "booking": details });

    if req.send_checkin_link {
        body["checkin"] = match sessions::initiate(&state, booking_id).await {
            Ok(initiated) => {
                let (_, Json(checkin)) = initiated_response(&initiated);
                checkin
            }
            Err(e) => {
                tracing::warn!(booking_id, error = %e, "booking created but check-in could not be initiated");
                json!({ "status": "error", "code": e.code(), "message": e.to_string() })
            }
        };
    }

    Ok((StatusCode::CREATED, Json(body)))
}

// GET /bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingDetails>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let conn = state.conn()?;
    let details = queries::get_booking_details(&conn, id)?.ok_or(AppError::BookingNotFound)?;
    Ok(Json(details))
}

// GET /bookings/:id/guests
pub async fn get_guests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Guest>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let conn = state.conn()?;
    queries::get_booking(&conn, id)?.ok_or(AppError::BookingNotFound)?;
    Ok(Json(queries::get_guests_for_booking(&conn, id)?))
}

// POST /bookings/:id/checkout
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<CheckoutOutcome>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut conn = state.conn()?;
    let outcome = crate::services::checkout::checkout(&mut conn, id, Utc::now().naive_utc())?;
    Ok(Json(outcome))
}
