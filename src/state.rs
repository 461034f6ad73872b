//! State handed to every module handler.

use crate::config::ListLimits;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ModuleState {
    pub pool: PgPool,
    pub limits: ListLimits,
}
