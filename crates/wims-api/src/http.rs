//! HTTP status handling for adm/raw responses.
//!
//! The server answers refusals with `200 OK` and an `ERROR` status in the body,
//! so anything other than 2xx here is a transport-level problem (proxy,
//! misconfigured endpoint, throttling).

use reqwest::StatusCode;
use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::ApiError;

/// Pass a 2xx response through. Throttling becomes [`ApiError::RateLimited`]
/// and any other status [`ApiError::Api`] carrying the body text.
pub fn check_response(resp: Response) -> Result<Response, ApiError> {
    match status_error(resp.status(), resp.headers()) {
        None => Ok(resp),
        Some(StatusFailure::RateLimited(retry_after_secs)) => {
            Err(ApiError::RateLimited { retry_after_secs })
        }
        Some(StatusFailure::Unsuccessful(status)) => Err(ApiError::Api {
            status,
            message: resp.text().unwrap_or_default(),
        }),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StatusFailure {
    RateLimited(u64),
    Unsuccessful(u16),
}

fn status_error(status: StatusCode, headers: &HeaderMap) -> Option<StatusFailure> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(StatusFailure::RateLimited(parse_retry_after(headers)));
    }
    if !status.is_success() {
        return Some(StatusFailure::Unsuccessful(status.as_u16()));
    }
    None
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
