//! Standard response envelope helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub data: T,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(Success { success: true, data })).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(Success { success: true, data })).into_response()
}

/// `{"message": ...}` payload for write operations that return nothing else.
pub fn message(text: &'static str) -> Response {
    success(serde_json::json!({ "message": text }))
}
