//! HTTP rendering of domain errors.
//!
//! Server-side failures are logged in full and reach clients as a generic
//! message without details. Lockouts carry a `Retry-After` date taken from
//! the `lockedUntil` detail.

use actix_web::http::header::{self, HttpDate};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::DateTime;
use std::time::SystemTime;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Locked => StatusCode::LOCKED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload clients may see.
fn client_view(error: &Error) -> Error {
    let message = match error.code() {
        ErrorCode::InternalError => INTERNAL_MESSAGE,
        ErrorCode::ServiceUnavailable => UNAVAILABLE_MESSAGE,
        _ => return error.clone(),
    };
    let redacted = Error::new(error.code(), message);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

/// `Retry-After` value for a lockout, if the error says when it ends.
fn retry_after(error: &Error) -> Option<HttpDate> {
    if error.code() != ErrorCode::Locked {
        return None;
    }
    let until = error.details()?.get("lockedUntil")?.as_str()?;
    let until = DateTime::parse_from_rfc3339(until).ok()?;
    Some(HttpDate::from(SystemTime::from(until)))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = ?self.code(),
                message = self.message(),
                trace_id = self.trace_id(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if let Some(date) = retry_after(self) {
            builder.insert_header((header::RETRY_AFTER, date));
        }
        builder.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}
