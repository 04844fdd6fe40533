//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The maximum number of characters of a body that is logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and tokens in JSON bodies are replaced with asterisks.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return (StatusCode::BAD_REQUEST, "Could not read request body").into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    log_body("Received request", &format!("{} {}", parts.method, parts.uri), &redact(&body_text));

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    log_body("Sending response", parts.status.as_str(), &redact(&body_text));

    Response::from_parts(parts, body_bytes.into())
}

/// Replace the sensitive fields of a JSON object, including nested objects.
/// Bodies that are not JSON are returned unchanged.
fn redact(body_text: &str) -> String {
    match serde_json::from_str::<Value>(body_text) {
        Ok(mut value @ Value::Object(_)) => {
            redact_value(&mut value);
            value.to_string()
        }
        _ => body_text.to_string(),
    }
}

fn redact_value(value: &mut Value) {
    if let Value::Object(fields) = value {
        for (key, field) in fields.iter_mut() {
            if REDACTED_FIELDS.contains(&key.as_str()) {
                *field = Value::String("********".to_owned());
            } else {
                redact_value(field);
            }
        }
    }
}

fn log_body(message: &str, summary: &str, body: &str) {
    if body.chars().count() > LOG_BODY_LENGTH_LIMIT {
        let truncated: String = body.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
        tracing::info!("{message}: {summary}\nbody: {truncated}...");
        tracing::debug!("Full body: {body}");
    } else {
        tracing::info!("{message}: {summary}\nbody: {body}");
    }
}
