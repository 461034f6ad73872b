//! Host side: mounts an initialized module behind an axum fallback, plus health/readiness/version routes.

use crate::error::AppError;
use crate::plugin::{ModulePlugin, ModuleRequest};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Request bodies above this size are rejected with 413 before reaching a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub type SharedModule = Arc<dyn ModulePlugin>;

/// Every request not claimed by another router is resolved through the module's route table.
pub fn module_router(module: SharedModule) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(module)
}

async fn dispatch(
    State(module): State<SharedModule>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let path = uri.path();
    let handler = match module.resolve_handler(path, method.as_str()) {
        Ok(h) => h,
        Err(e) => {
            tracing::debug!(module = module.module_code(), error = %e, "no route");
            return AppError::from(e).into_response();
        }
    };
    tracing::debug!(handler = handler.name(), "dispatch");
    let req = ModuleRequest {
        method: method.as_str().to_string(),
        path: path.to_string(),
        query,
        body,
    };
    handler.call(req).await
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(pool): State<PgPool>) -> (StatusCode, Json<ReadyBody>) {
    match sqlx::query("SELECT 1").fetch_optional(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyBody {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready (database round trip), GET /version.
pub fn common_routes(pool: PgPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::CustomerModule;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tracing::Span;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/customer_module_test")
            .unwrap()
    }

    fn app() -> Router {
        let pool = lazy_pool();
        let mut module = CustomerModule::default();
        module.initialize(pool.clone(), Span::none()).unwrap();
        Router::new()
            .merge(common_routes(pool))
            .merge(module_router(Arc::new(module)))
    }

    async fn send(method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_and_version() {
        let (status, body) = send("GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send("GET", "/version", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "customer-module");
    }

    #[tokio::test]
    async fn unregistered_method_is_not_found() {
        let (status, body) = send("PATCH", "/customers/1", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "handler not found for route: PATCH /customers/1");
    }

    #[tokio::test]
    async fn trailing_slash_is_not_a_customer_id() {
        let (status, body) = send("GET", "/customers/", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected_before_the_database() {
        let (status, body) = send("GET", "/customers/abc", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid customer ID");
    }

    #[tokio::test]
    async fn update_without_known_fields_is_bad_request() {
        let (status, body) = send("PUT", "/customers/1", r#"{"unknown": 1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No fields to update");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = send("POST", "/customers", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn invalid_email_is_bad_request() {
        let (status, body) = send("POST", "/customers", r#"{"first_name": "Ann", "email": "ann"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["error"]["message"], "email must be a valid email");
    }

    #[tokio::test]
    async fn ticket_without_subject_is_bad_request() {
        let (status, body) = send("POST", "/support-tickets", r#"{"description": "jammed"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["error"]["message"], "subject is required");
    }

    #[tokio::test]
    async fn ticket_filter_must_be_numeric() {
        let (status, body) = send("GET", "/support-tickets?customer_id=x", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid customer_id");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let big = format!(r#"{{"notes": "{}"}}"#, "x".repeat(MAX_BODY_BYTES + 1));
        let (status, _) = send("POST", "/customers", &big).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
