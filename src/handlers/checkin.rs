use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{bearer_token, check_auth};
use crate::errors::AppError;
use crate::models::{NewGuest, SessionStatus};
use crate::services::finalize::{finalize_checkin, FinalizeOutcome};
use crate::services::notify::mask_email;
use crate::services::sessions::{self, Delivery, SessionLookup};
use crate::state::AppState;

// POST /checkin/initiate
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    booking_id: i64,
}

pub async fn initiate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<InitiateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let initiated = sessions::initiate(&state, req.booking_id).await?;
    Ok(initiated_response(&initiated))
}

pub(crate) fn initiated_response(initiated: &sessions::Initiated) -> (StatusCode, Json<Value>) {
    let session = &initiated.session;
    let mut body = json!({
        "status": "success",
        "bookingInfoId": session.id,
        "bookingId": session.booking_id,
        "token": session.token,
        "checkin_code": session.checkin_code,
        "expiresAt": session.expires_at,
        "codeExpiresAt": session.code_expires_at,
        "email": mask_email(&session.guest_email),
        "emailStatus": session.email_status,
    });

    match &initiated.delivery {
        Delivery::Sent => (StatusCode::OK, Json(body)),
        Delivery::Failed(error) => {
            body["status"] = json!("warning");
            body["message"] = json!("check-in session created but the email could not be delivered");
            body["emailError"] = json!(error);
            (StatusCode::PARTIAL_CONTENT, Json(body))
        }
    }
}

// POST /checkin/validate
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(alias = "checkin_code")]
    checkin_code: String,
    #[serde(default)]
    query: String,
}

pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<Value>, AppError> {
    let session = {
        let conn = state.conn()?;
        sessions::validate_by_code(&conn, &req.checkin_code, &req.query, Utc::now().naive_utc())?
    };

    Ok(Json(json!({
        "status": "success",
        "token": session.token,
        "bookingInfoId": session.id,
    })))
}

// GET /checkin/verify?token=...
#[derive(Deserialize)]
pub struct VerifyQuery {
    token: Option<String>,
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<VerifyQuery>,
) -> Result<Json<Value>, AppError> {
    let token = params
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or(AppError::InvalidOrExpiredToken)?
        .to_string();

    let view = {
        let conn = state.conn()?;
        sessions::validate_by_token(&conn, &token, Utc::now().naive_utc())?
    };

    let booking = &view.details.booking;
    let rooms: Vec<Value> = view
        .details
        .rooms
        .iter()
        .map(|r| {
            json!({
                "roomId": r.room.id,
                "roomNumber": r.room.room_number,
                "roomType": r.room.room_type,
                "nights": r.nights,
            })
        })
        .collect();

    if booking.is_checked_in() || view.session.status == SessionStatus::Completed {
        return Ok(Json(json!({
            "status": "already_checked_in",
            "bookingId": booking.id,
            "referenceCode": booking.reference_code,
            "checkedInAt": booking.checked_in_at,
            "checkInDate": booking.check_in_date,
            "checkOutDate": booking.check_out_date,
            "nights": view.nights,
            "customer": view.details.customer,
            "rooms": rooms,
            "adults": booking.adults,
            "children": booking.children,
            "accompanyingGuests": booking.accompanying_guests,
        })));
    }

    Ok(Json(json!({
        "status": "success",
        "bookingInfoId": view.session.id,
        "bookingId": booking.id,
        "referenceCode": booking.reference_code,
        "guestEmail": view.session.guest_email,
        "guestLastName": view.session.guest_last_name,
        "expiresAt": view.session.expires_at,
        "checkInDate": booking.check_in_date,
        "checkOutDate": booking.check_out_date,
        "nights": view.nights,
        "rooms": rooms,
        "adults": booking.adults,
        "children": booking.children,
        "accompanyingGuests": booking.accompanying_guests,
    })))
}

// POST /checkin
#[derive(Deserialize)]
pub struct FinalizeRequest {
    token: String,
    #[serde(default)]
    guests: Vec<NewGuest>,
    #[serde(default)]
    consents: Vec<i64>,
}

pub async fn finalize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FinalizeRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = {
        let mut conn = state.conn()?;
        finalize_checkin(
            &mut conn,
            &req.token,
            &req.guests,
            &req.consents,
            Utc::now().naive_utc(),
        )?
    };

    let body = match outcome {
        FinalizeOutcome::Completed {
            booking_id,
            guest_ids,
        } => json!({
            "status": "success",
            "bookingId": booking_id,
            "alreadyCompleted": false,
            "guestIds": guest_ids,
        }),
        FinalizeOutcome::AlreadyCompleted { booking_id } => json!({
            "status": "success",
            "bookingId": booking_id,
            "alreadyCompleted": true,
        }),
    };
    Ok(Json(body))
}

// POST /checkin/resend
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    booking_info_id: Option<i64>,
    checkin_code: Option<String>,
}

pub async fn resend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendRequest>,
) -> Result<Json<Value>, AppError> {
    let lookup = match (req.booking_info_id, req.checkin_code) {
        (Some(id), _) => SessionLookup::Id(id),
        (None, Some(code)) if !code.trim().is_empty() => SessionLookup::Code(code),
        _ => {
            return Err(AppError::Validation(
                "bookingInfoId or checkinCode is required".to_string(),
            ))
        }
    };

    let session = sessions::resend(&state, &lookup)?;
    Ok(Json(json!({
        "status": "success",
        "bookingInfoId": session.id,
        "codeExpiresAt": session.code_expires_at,
    })))
}
