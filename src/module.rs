//! The customer module: route table over the customer and support-ticket handlers.

use crate::config::{ListLimits, ModuleConfig};
use crate::error::{AppError, InitError, RouteNotFound};
use crate::handlers::{customers, tickets};
use crate::plugin::{Handler, HandlerRef, ModulePlugin};
use crate::routing::RouteTable;
use crate::state::ModuleState;
use sqlx::PgPool;
use tracing::Span;

struct Wired {
    state: ModuleState,
    span: Span,
    routes: RouteTable<Handler>,
}

/// Routes resolve only between `initialize` and `cleanup`.
pub struct CustomerModule {
    limits: ListLimits,
    wired: Option<Wired>,
}

impl CustomerModule {
    pub const CODE: &'static str = "customer";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(limits: ListLimits) -> Self {
        CustomerModule { limits, wired: None }
    }

    pub fn boxed(config: &ModuleConfig) -> Box<dyn ModulePlugin> {
        Box::new(CustomerModule::new(config.limits))
    }

    fn route_table() -> Result<RouteTable<Handler>, InitError> {
        let table = RouteTable::builder()
            .route("GET", "/customers", Handler::new("customers.list", customers::list))?
            .route("POST", "/customers", Handler::new("customers.create", customers::create))?
            .route("GET", "/customers/{id}", Handler::new("customers.read", customers::read))?
            .route("PUT", "/customers/{id}", Handler::new("customers.update", customers::update))?
            .route("DELETE", "/customers/{id}", Handler::new("customers.delete", customers::delete))?
            .route("GET", "/support-tickets", Handler::new("tickets.list", tickets::list))?
            .route("POST", "/support-tickets", Handler::new("tickets.create", tickets::create))?
            .build();
        Ok(table)
    }
}

impl Default for CustomerModule {
    fn default() -> Self {
        CustomerModule::new(ListLimits::default())
    }
}

impl ModulePlugin for CustomerModule {
    fn initialize(&mut self, pool: PgPool, log: Span) -> Result<(), InitError> {
        let routes = Self::route_table()?;
        log.in_scope(|| {
            tracing::info!(routes = routes.len(), "customer module initialized");
            for route in routes.routes() {
                tracing::debug!(%route, "registered");
            }
        });
        self.wired = Some(Wired {
            state: ModuleState {
                pool,
                limits: self.limits,
            },
            span: log,
            routes,
        });
        Ok(())
    }

    fn module_code(&self) -> &'static str {
        Self::CODE
    }

    fn module_version(&self) -> &'static str {
        Self::VERSION
    }

    fn cleanup(&mut self) -> Result<(), AppError> {
        if let Some(wired) = self.wired.take() {
            wired.span.in_scope(|| tracing::info!("cleaning up customer module"));
        }
        Ok(())
    }

    fn resolve_handler(&self, path: &str, method: &str) -> Result<HandlerRef, RouteNotFound> {
        let Some(wired) = &self.wired else {
            return Err(RouteNotFound {
                method: method.to_ascii_uppercase(),
                path: path.to_string(),
            });
        };
        let handler = wired.routes.resolve(method, path)?;
        Ok(HandlerRef::new(handler.clone(), wired.state.clone(), wired.span.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/customer_module_test")
            .unwrap()
    }

    fn initialized() -> CustomerModule {
        let mut module = CustomerModule::default();
        module.initialize(lazy_pool(), Span::none()).unwrap();
        module
    }

    #[tokio::test]
    async fn resolves_the_module_surface() {
        let module = initialized();
        let cases = [
            ("GET", "/customers", "customers.list"),
            ("POST", "/customers", "customers.create"),
            ("GET", "/customers/12", "customers.read"),
            ("PUT", "/customers/12", "customers.update"),
            ("DELETE", "/customers/12", "customers.delete"),
            ("GET", "/support-tickets", "tickets.list"),
            ("POST", "support-tickets", "tickets.create"),
            ("get", "/customers/12", "customers.read"),
        ];
        for (method, path, name) in cases {
            let handler = module.resolve_handler(path, method).unwrap();
            assert_eq!(handler.name(), name, "{} {}", method, path);
        }
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let module = initialized();
        let err = module.resolve_handler("/customers/1", "PATCH").err().unwrap();
        assert_eq!(err.method, "PATCH");
        assert_eq!(err.path, "/customers/1");
        assert!(module.resolve_handler("/support-tickets/3", "GET").is_err());
        assert!(module.resolve_handler("/customers/1/tickets", "GET").is_err());
    }

    #[tokio::test]
    async fn nothing_resolves_outside_the_lifecycle() {
        let mut module = CustomerModule::default();
        assert!(module.resolve_handler("/customers", "GET").is_err());

        module.initialize(lazy_pool(), Span::none()).unwrap();
        assert!(module.resolve_handler("/customers", "GET").is_ok());

        module.cleanup().unwrap();
        assert!(module.resolve_handler("/customers", "GET").is_err());
    }
}
