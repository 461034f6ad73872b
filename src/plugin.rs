//! Host/module contract: lifecycle, handler lookup, and the static table of module factories.

use crate::config::ModuleConfig;
use crate::error::{AppError, InitError, RouteNotFound};
use crate::module::CustomerModule;
use crate::routing::split_path;
use crate::state::ModuleState;
use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{Instrument, Span};

/// What the host needs from a loaded module.
pub trait ModulePlugin: Send + Sync {
    /// Wire the module to its data store and log span, and register its routes.
    fn initialize(&mut self, pool: PgPool, log: Span) -> Result<(), InitError>;
    fn module_code(&self) -> &'static str;
    fn module_version(&self) -> &'static str;
    fn cleanup(&mut self) -> Result<(), AppError>;
    fn resolve_handler(&self, path: &str, method: &str) -> Result<HandlerRef, RouteNotFound>;
}

/// Inbound request as seen by a module handler.
#[derive(Clone, Debug, Default)]
pub struct ModuleRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl ModuleRequest {
    pub fn new(method: &str, path: &str) -> Self {
        ModuleRequest {
            method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Path segment at `index`, counting from the first segment after the leading `/`.
    pub fn segment(&self, index: usize) -> Option<&str> {
        split_path(&self.path).get(index).copied()
    }

    /// Query parameter, with empty values treated as absent.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::warn!(error = %e, "rejected request body");
            AppError::BadRequest("Invalid request body".into())
        })
    }
}

pub type BoxResponseFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

type HandlerFn = dyn Fn(ModuleState, ModuleRequest) -> BoxResponseFuture + Send + Sync;

/// A named module handler, not yet bound to module state.
#[derive(Clone)]
pub struct Handler {
    name: &'static str,
    f: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F, Fut>(name: &'static str, f: F) -> Self
    where
        F: Fn(ModuleState, ModuleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, AppError>> + Send + 'static,
    {
        let f = move |state: ModuleState, req: ModuleRequest| -> BoxResponseFuture {
            let fut = f(state, req);
            Box::pin(async move {
                match fut.await {
                    Ok(resp) => resp,
                    Err(e) => e.into_response(),
                }
            })
        };
        Handler { name, f: Arc::new(f) }
    }
}

/// Handler bound to the module's state and log span, ready to be invoked by the host.
#[derive(Clone)]
pub struct HandlerRef {
    handler: Handler,
    state: ModuleState,
    span: Span,
}

impl HandlerRef {
    pub fn new(handler: Handler, state: ModuleState, span: Span) -> Self {
        HandlerRef { handler, state, span }
    }

    pub fn name(&self) -> &'static str {
        self.handler.name
    }

    pub async fn call(self, req: ModuleRequest) -> Response {
        let span = tracing::info_span!(
            parent: &self.span,
            "handler",
            handler = self.handler.name,
            method = %req.method,
            path = %req.path
        );
        (self.handler.f)(self.state, req).instrument(span).await
    }
}

/// Constructor the host looks up by module code.
pub struct ModuleFactory {
    pub code: &'static str,
    pub create: fn(&ModuleConfig) -> Box<dyn ModulePlugin>,
}

/// Every module compiled into this binary.
pub static MODULES: &[ModuleFactory] = &[ModuleFactory {
    code: CustomerModule::CODE,
    create: CustomerModule::boxed,
}];

pub fn find_module(code: &str) -> Option<&'static ModuleFactory> {
    MODULES.iter().find(|m| m.code == code)
}
