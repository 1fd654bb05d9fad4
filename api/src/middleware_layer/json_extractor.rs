use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Request fields the report and chat bodies accept.
const KNOWN_FIELDS: [&str; 5] = ["countries", "year_from", "year_to", "kind", "message"];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    KNOWN_FIELDS
        .iter()
        .find(|key| msg.contains(*key))
        .map(|key| key.to_string())
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("unknown variant") {
        Some("Report kind must be \"hotspot_prediction\" or \"impact_analysis\".".into())
    } else if msg.contains("did not match any variant") {
        Some("Countries may be a single string or an array of strings.".into())
    } else if msg.contains("invalid type: string") && msg.contains("i32") {
        Some("Years are integers (e.g. 2019), not strings.".into())
    } else if msg.contains("expected struct") || msg.contains("expected a map") {
        Some("Expected a JSON object here (e.g. { \"message\": \"...\" }).".into())
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts
        .headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(value) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", value);
    }
    id
}

fn rejection_code(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::BAD_REQUEST => Some("BAD_REQUEST"),
        StatusCode::UNPROCESSABLE_ENTITY => Some("UNPROCESSABLE_ENTITY"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => Some("UNSUPPORTED_MEDIA_TYPE"),
        _ => None,
    }
}

/// Rewrites plain-text `Json<T>` extractor rejections (400/415/422) into the
/// JSON envelope, with the offending field and a hint when one is known.
///
/// Replies that already carry a JSON body pass through untouched.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let Some(code) = rejection_code(status) else {
        return res;
    };
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let req_id = ensure_request_id(&mut parts);
    debug!(request_id = %req_id, %status, "rewriting extractor rejection");

    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&original),
        hint: hint_for(&original),
    };

    let details = if detail.path.is_some() || detail.hint.is_some() {
        vec![detail]
    } else {
        Vec::new()
    };
    let envelope = ApiResponse::<()>::error(code, original.trim(), details);

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_field_from_serde_message() {
        let msg = "Failed to deserialize the JSON body into the target type: year_from: invalid type: string \"2019\", expected i32";
        assert_eq!(guess_path_from_serde_msg(msg).as_deref(), Some("year_from"));
        assert!(hint_for(msg).is_some());
        assert_eq!(guess_path_from_serde_msg("EOF while parsing"), None);
    }

    #[test]
    fn unknown_kind_gets_a_hint() {
        let msg = "kind: unknown variant `weekly`, expected `hotspot_prediction` or `impact_analysis`";
        assert!(hint_for(msg).unwrap().contains("impact_analysis"));
    }

    #[test]
    fn only_extractor_statuses_are_rewritten() {
        assert_eq!(
            rejection_code(StatusCode::UNPROCESSABLE_ENTITY),
            Some("UNPROCESSABLE_ENTITY")
        );
        assert_eq!(rejection_code(StatusCode::NOT_FOUND), None);
        assert_eq!(rejection_code(StatusCode::BAD_GATEWAY), None);
    }
}
