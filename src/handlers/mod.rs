//! Module handlers. Each takes the module state and the request and returns the envelope response.

pub mod customers;
pub mod tickets;

use crate::error::AppError;
use crate::plugin::ModuleRequest;
use crate::sql::SqlArg;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

/// Recorded as `created_by` until requests carry an authenticated user.
pub const SYSTEM_USER_ID: i32 = 1;

/// Numeric id from the second path segment (`/customers/{id}`); `invalid` is the 400 message otherwise.
pub(crate) fn parse_id(req: &ModuleRequest, invalid: &str) -> Result<i32, AppError> {
    req.segment(1)
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| AppError::BadRequest(invalid.to_string()))
}

/// Positional arguments in builder order, ready for `query_with` / `query_as_with`.
pub(crate) fn arguments(args: Vec<SqlArg>) -> Result<PgArguments, AppError> {
    let mut out = PgArguments::default();
    for arg in args {
        out.add(arg)
            .map_err(|e| AppError::db("Failed to bind query parameters")(sqlx::Error::Encode(e)))?;
    }
    Ok(out)
}
