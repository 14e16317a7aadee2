//! Success envelope shared by every handler.
//!
//! Successful responses read `{ "success": true, "<key>": payload }`, with an
//! optional `message`. The payload key names the resource (`project`,
//! `tasks`, `token`, ...) so clients can address it directly.

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

/// `{ "success": true, "message"?: ..., ...payload }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload placeholder for message-only responses.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Payload for responses carrying one or more named values of one type.
pub type Keyed<T> = BTreeMap<&'static str, T>;

/// Handler return type for envelope responses.
pub type ApiJson<T> = Json<ApiResponse<T>>;

/// `{ "success": true, "<key>": value }`.
pub fn keyed<T: Serialize>(key: &'static str, value: T) -> ApiJson<Keyed<T>> {
    Json(ApiResponse {
        success: true,
        message: None,
        payload: Keyed::from([(key, value)]),
    })
}

/// `{ "success": true, "message": msg, "<key>": value }`.
pub fn keyed_with_message<T: Serialize>(
    message: impl Into<String>,
    key: &'static str,
    value: T,
) -> ApiJson<Keyed<T>> {
    Json(ApiResponse {
        success: true,
        message: Some(message.into()),
        payload: Keyed::from([(key, value)]),
    })
}

/// `{ "success": true, ...payload }` for a struct payload whose fields are
/// already named.
pub fn with_payload<T: Serialize>(payload: T) -> ApiJson<T> {
    Json(ApiResponse {
        success: true,
        message: None,
        payload,
    })
}

/// `{ "success": true, "message": msg }`.
pub fn message(message: impl Into<String>) -> ApiJson<Empty> {
    Json(ApiResponse {
        success: true,
        message: Some(message.into()),
        payload: Empty {},
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_keyed_envelope_shape() {
        let Json(body) = keyed("departments", vec!["Design", "Civil"]);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "success": true, "departments": ["Design", "Civil"] })
        );
    }

    #[test]
    fn test_message_envelope_shape() {
        let Json(body) = message("Cost deleted");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "success": true, "message": "Cost deleted" })
        );
    }

    #[test]
    fn test_struct_payload_is_flattened() {
        #[derive(Serialize)]
        struct Login {
            token: &'static str,
            role: &'static str,
        }
        let Json(body) = with_payload(Login {
            token: "t",
            role: "User",
        });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "success": true, "token": "t", "role": "User" })
        );
    }
}
