//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Misuse of the query builders, or an update payload with nothing to write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed clause '{template}': {markers} placeholder(s), {values} value(s)")]
    MalformedClause {
        template: String,
        markers: usize,
        values: usize,
    },
    #[error("no updatable fields")]
    NoUpdatableFields,
}

/// No registered route matches the method and path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler not found for route: {method} {path}")]
pub struct RouteNotFound {
    pub method: String,
    pub path: String,
}

/// Route table registration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: &'static str },
    #[error("duplicate route: {method} {template}")]
    Duplicate { method: String, template: String },
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("route table: {0}")]
    Routes(#[from] RouteError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    RouteNotFound(#[from] RouteNotFound),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{context}")]
    Db {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    /// Wrap a data-access failure with the message the client is allowed to see.
    pub fn db(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Db { context, source }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(source: sqlx::Error) -> Self {
        AppError::Db {
            context: "Database error",
            source,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Query(QueryError::NoUpdatableFields) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Query(QueryError::MalformedClause { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            AppError::RouteNotFound(_) | AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Db { source, .. } => {
                if let sqlx::Error::RowNotFound = source {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        }
    }

    /// Text returned to the client. Internal failures never carry the underlying error.
    fn client_message(&self) -> String {
        match self {
            AppError::Query(QueryError::MalformedClause { .. }) => "Internal server error".into(),
            AppError::Query(QueryError::NoUpdatableFields) => "No fields to update".into(),
            AppError::Db { source: sqlx::Error::RowNotFound, .. } => "Not found".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        match &self {
            AppError::Db { context, source } if status.is_server_error() => {
                tracing::error!(error = %source, "{}", context);
            }
            AppError::Query(e @ QueryError::MalformedClause { .. }) => {
                tracing::error!(error = %e, "query builder misuse");
            }
            _ => {}
        }
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code,
                message: self.client_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}
