use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::check_auth;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Consent, ConsentLog};
use crate::services::consents::{self, AttachRequest, ConsentAcceptance, NewConsent};
use crate::state::AppState;

// POST /consents (get-or-create by slug and version)
pub async fn create_consent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewConsent>,
) -> Result<(StatusCode, Json<Consent>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let conn = state.conn()?;
    let (consent, created) = consents::create_template(&conn, &req)?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(consent)))
}

// GET /consents
pub async fn list_consents(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Consent>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(queries::list_consents(&conn)?))
}

// POST /consent-logs
pub async fn create_consent_log(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConsentAcceptance>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let conn = state.conn()?;
    let id = consents::record_acceptance(&conn, &req, Utc::now().naive_utc())?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "success", "id": id }))))
}

// PATCH /consent-logs/attach-booking
pub async fn attach_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AttachRequest>,
) -> Result<Json<Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let conn = state.conn()?;
    let (booking_id, linked) = consents::attach_booking(&conn, &req, Utc::now().naive_utc())?;
    Ok(Json(json!({
        "status": "success",
        "bookingId": booking_id,
        "linked": linked,
    })))
}

// GET /consent-logs?bookingId=
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentLogQuery {
    booking_id: Option<i64>,
}

pub async fn list_consent_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ConsentLogQuery>,
) -> Result<Json<Vec<ConsentLog>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let conn = state.conn()?;
    Ok(Json(consents::list_logs(&conn, params.booking_id)?))
}
