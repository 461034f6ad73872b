//! Customer module: customers and support tickets for the ERP module host, backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod models;
pub mod module;
pub mod plugin;
pub mod response;
pub mod routing;
pub mod schema;
pub mod sql;
pub mod state;
pub mod validation;

pub use config::{ListLimits, ModuleConfig};
pub use error::{AppError, ConfigError, InitError, QueryError, RouteError, RouteNotFound};
pub use host::{common_routes, module_router};
pub use module::CustomerModule;
pub use plugin::{find_module, HandlerRef, ModulePlugin, ModuleRequest, MODULES};
pub use response::{created, success};
pub use routing::RouteTable;
pub use schema::ensure_tables;
pub use sql::{QueryBuilder, SqlArg, WhitelistUpdateBuilder};
pub use state::ModuleState;
