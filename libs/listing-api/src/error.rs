use axum::http::StatusCode;
use listing_core::{Error, ErrorKind};
use tracing::error;

use crate::problem::{Problem, ProblemResponse};

/// Map listing errors to RFC 9457 Problem responses.
///
/// Client errors carry their message verbatim. Configuration and database
/// failures are logged and answered with a generic detail.
pub fn listing_error_to_problem(e: &Error, instance: &str) -> ProblemResponse {
    let status = StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !e.is_client_error() {
        error!(error = %e, kind = ?e.kind(), instance, "listing request failed");
    }

    let (code, detail) = match e {
        Error::InvalidParamJson { .. } => ("LISTING_PARAM_INVALID_JSON", e.to_string()),
        Error::FiltersNotRegistered(_) => ("FILTER_NOT_REGISTERED", e.to_string()),
        Error::SortersNotRegistered(_) => ("SORTER_NOT_REGISTERED", e.to_string()),
        Error::InvalidFilterValue { .. } => ("INVALID_FILTER_VALUE", e.to_string()),
        Error::MissingSession(_) => ("MISSING_DB_SESSION", e.to_string()),
        _ => match e.kind() {
            ErrorKind::Config => (
                "LISTING_MISCONFIGURED",
                "listing endpoint is misconfigured".to_string(),
            ),
            ErrorKind::Database => ("INTERNAL_DB", "internal database error".to_string()),
            ErrorKind::Contract | ErrorKind::Client => {
                ("LISTING_CONTRACT_VIOLATION", e.to_string())
            }
        },
    };

    Problem::from_status(status, detail)
        .with_code(code)
        .with_instance(instance)
        .into()
}

impl From<Error> for ProblemResponse {
    fn from(e: Error) -> Self {
        listing_error_to_problem(&e, "/")
    }
}
