//! Error response mapping
//!
//! Turns a non-2xx response into an [`ErrorKind`]. Both Cloud Controller
//! error envelopes are understood; anything else (an HTML page from a proxy,
//! an empty body) becomes a transport error carrying the status and a
//! truncated body snippet.

use crate::error::{ApiError, ErrorKind};
use reqwest::StatusCode;
use serde::Deserialize;

/// Maximum length of response body to log or keep in an error
const MAX_LOG_BODY_LENGTH: usize = 200;

/// v2 error envelope
#[derive(Debug, Deserialize)]
struct V2ErrorBody {
    code: i64,
    description: String,
    error_code: String,
}

/// v3 error envelope
#[derive(Debug, Deserialize)]
struct V3ErrorBody {
    errors: Vec<V3Error>,
}

#[derive(Debug, Deserialize)]
struct V3Error {
    code: i64,
    title: String,
    detail: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    V2(V2ErrorBody),
    V3(V3ErrorBody),
}

/// Truncate a response body and strip control characters for logging
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let total = body.chars().count();
    let truncated = if total > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Map a non-2xx response to a structured error
pub fn map_error_response(status: StatusCode, body: &str) -> ErrorKind {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope::V2(err)) => ErrorKind::Api(ApiError {
            status: status.as_u16(),
            code: err.code,
            error_code: err.error_code,
            description: err.description,
        }),
        Ok(ErrorEnvelope::V3(envelope)) => match envelope.errors.into_iter().next() {
            Some(err) => ErrorKind::Api(ApiError {
                status: status.as_u16(),
                code: err.code,
                error_code: err.title,
                description: err.detail,
            }),
            None => unrecognized(status, body),
        },
        Err(_) => unrecognized(status, body),
    }
}

fn unrecognized(status: StatusCode, body: &str) -> ErrorKind {
    ErrorKind::Transport {
        message: format!("unexpected response: {}", status),
        status: Some(status.as_u16()),
        body: Some(sanitize_for_log(body)),
        source: None,
    }
}
