use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("booking not found")]
    BookingNotFound,

    #[error("check-in session not found")]
    SessionNotFound,

    #[error("booking has no customer")]
    MissingCustomer,

    #[error("booking has no room assigned")]
    MissingRoom,

    #[error("customer has no contact email")]
    MissingContactEmail,

    #[error("booking is already checked in")]
    AlreadyCheckedIn,

    #[error("booking is already checked out")]
    BookingAlreadyCheckedOut,

    #[error("a check-in session is already active for this booking")]
    CheckinAlreadyInitiated,

    #[error("check-in code must be 8 letters or digits")]
    InvalidFormat,

    #[error("invalid or expired check-in code")]
    InvalidOrExpiredCode,

    #[error("invalid or expired check-in link")]
    InvalidOrExpiredToken,

    #[error("booking has been checked out; this check-in link is no longer valid")]
    BookingCheckedOut,

    #[error("booking is not checked in")]
    NotCheckedIn,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("check-in could not be finalized: {0}")]
    FinalizeFailed(String),

    #[error("could not allocate a unique check-in credential")]
    CodeGenerationExhausted,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Coarse error classes the transport layer maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Gone,
    Unauthorized,
    Validation,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BookingNotFound | AppError::SessionNotFound => ErrorKind::NotFound,
            AppError::AlreadyCheckedIn
            | AppError::CheckinAlreadyInitiated
            | AppError::NotCheckedIn => ErrorKind::Conflict,
            AppError::BookingAlreadyCheckedOut | AppError::BookingCheckedOut => ErrorKind::Gone,
            AppError::InvalidOrExpiredCode
            | AppError::InvalidOrExpiredToken
            | AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::MissingCustomer
            | AppError::MissingRoom
            | AppError::MissingContactEmail
            | AppError::InvalidFormat
            | AppError::Validation(_) => ErrorKind::Validation,
            AppError::FinalizeFailed(_)
            | AppError::CodeGenerationExhausted
            | AppError::Database(_)
            | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BookingNotFound => "bookingNotFound",
            AppError::SessionNotFound => "sessionNotFound",
            AppError::MissingCustomer => "missingCustomer",
            AppError::MissingRoom => "missingRoom",
            AppError::MissingContactEmail => "missingContactEmail",
            AppError::AlreadyCheckedIn => "alreadyCheckedIn",
            AppError::BookingAlreadyCheckedOut | AppError::BookingCheckedOut => {
                "bookingCheckedOut"
            }
            AppError::CheckinAlreadyInitiated => "checkinAlreadyInitiated",
            AppError::InvalidFormat => "invalidFormat",
            AppError::InvalidOrExpiredCode => "invalidOrExpiredCode",
            AppError::InvalidOrExpiredToken => "invalidOrExpiredToken",
            AppError::NotCheckedIn => "notCheckedIn",
            AppError::Validation(_) => "validation",
            AppError::Unauthorized => "unauthorized",
            AppError::FinalizeFailed(_) => "finalizeFailed",
            AppError::CodeGenerationExhausted
            | AppError::Database(_)
            | AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Gone => StatusCode::GONE,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "request failed");
            if matches!(self, AppError::FinalizeFailed(_)) {
                "check-in could not be finalized".to_string()
            } else {
                "internal error".to_string()
            }
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": { "code": self.code(), "message": message }
        });
        (status, axum::Json(body)).into_response()
    }
}
