//! Customer handlers: list, read, create, update, soft delete.

use crate::config::ListLimits;
use crate::error::{AppError, QueryError};
use crate::handlers::{arguments, parse_id, SYSTEM_USER_ID};
use crate::models::{customer_number, Customer, NewCustomer, CUSTOMER_COLUMNS};
use crate::plugin::ModuleRequest;
use crate::response::{created, message, success};
use crate::sql::{CustomerUpdate, QueryBuilder, SqlArg};
use crate::state::ModuleState;
use crate::validation::RequestValidator;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::json;

/// One search term matched against every name/contact column.
const SEARCH_CLAUSE: &str =
    "(first_name ILIKE $%d OR last_name ILIKE $%d OR company_name ILIKE $%d OR email ILIKE $%d)";

const DEFAULT_CUSTOMER_TYPE: &str = "individual";
const INVALID_ID: &str = "Invalid customer ID";

/// SELECT for the customer list: optional `status`, `search` over the name/contact columns, clamped `limit`.
pub(crate) fn list_query(req: &ModuleRequest, limits: ListLimits) -> Result<(String, Vec<SqlArg>), QueryError> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM customers WHERE 1=1", CUSTOMER_COLUMNS));
    qb.add_optional_condition("status = $%d", req.query_param("status"))?;
    if let Some(search) = req.query_param("search") {
        qb.add_repeated_condition(SEARCH_CLAUSE, format!("%{}%", search))?;
    }
    let (mut sql, args) = qb.build();
    sql.push_str(&format!(
        " ORDER BY created_at DESC LIMIT {}",
        limits.apply(req.query_param("limit"))
    ));
    Ok((sql, args))
}

/// UPDATE for the sent fields; the row id is bound after them.
pub(crate) fn update_query(id: i32, update: &CustomerUpdate) -> Result<(String, Vec<SqlArg>), QueryError> {
    let set = update.set_clause()?;
    let sql = format!(
        "UPDATE customers SET {}, updated_at = NOW() WHERE id = ${}",
        set.to_sql(),
        set.next_index
    );
    let mut args = set.args;
    args.push(SqlArg::from(id));
    Ok((sql, args))
}

/// `GET /customers?status=&search=&limit=`
pub async fn list(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let (sql, args) = list_query(&req, state.limits)?;
    tracing::debug!(sql = %sql, args = args.len(), "query");
    let customers = sqlx::query_as_with::<_, Customer, _>(&sql, arguments(args)?)
        .fetch_all(&state.pool)
        .await
        .map_err(AppError::db("Failed to fetch customers"))?;

    let count = customers.len();
    Ok(success(json!({ "customers": customers, "count": count })))
}

/// `GET /customers/{id}`
pub async fn read(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let id = parse_id(&req, INVALID_ID)?;
    let sql = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);
    tracing::debug!(sql = %sql, id, "query");
    let customer: Customer = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(AppError::db("Failed to fetch customer"))?
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
    Ok(success(customer))
}

/// `POST /customers`
pub async fn create(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let new: NewCustomer = req.json()?;
    RequestValidator::email("email", new.email.as_deref())?;

    let number = customer_number(Utc::now());
    let sql = "INSERT INTO customers (customer_number, company_name, first_name, last_name, email, \
               phone, mobile, website, customer_type, credit_limit, payment_terms, tax_id, notes, created_by) \
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
               RETURNING id, created_at, updated_at";
    tracing::debug!(sql = %sql, customer_number = %number, "query");
    let (id, created_at, updated_at): (i32, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(sql)
        .bind(&number)
        .bind(new.company_name)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.mobile)
        .bind(new.website)
        .bind(new.customer_type.unwrap_or_else(|| DEFAULT_CUSTOMER_TYPE.to_string()))
        .bind(new.credit_limit)
        .bind(new.payment_terms)
        .bind(new.tax_id)
        .bind(new.notes)
        .bind(SYSTEM_USER_ID)
        .fetch_one(&state.pool)
        .await
        .map_err(AppError::db("Failed to create customer"))?;

    tracing::info!(id, customer_number = %number, "customer created");
    Ok(created(json!({
        "id": id,
        "customer_number": number,
        "created_at": created_at,
        "updated_at": updated_at,
        "message": "Customer created successfully",
    })))
}

/// `PUT /customers/{id}` with any subset of the updatable columns.
pub async fn update(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let id = parse_id(&req, INVALID_ID)?;
    let update: CustomerUpdate = req.json()?;
    if let Some(Some(email)) = &update.email {
        RequestValidator::email("email", Some(email))?;
    }
    let (sql, args) = update_query(id, &update)?;
    tracing::debug!(sql = %sql, args = args.len(), "query");
    let result = sqlx::query_with(&sql, arguments(args)?)
        .execute(&state.pool)
        .await
        .map_err(AppError::db("Failed to update customer"))?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Customer not found".into()));
    }
    Ok(message("Customer updated successfully"))
}

/// `DELETE /customers/{id}`: the row is kept and marked inactive.
pub async fn delete(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let id = parse_id(&req, INVALID_ID)?;
    let sql = "UPDATE customers SET status = 'inactive', updated_at = NOW() WHERE id = $1";
    tracing::debug!(sql = %sql, id, "query");
    let result = sqlx::query(sql)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(AppError::db("Failed to delete customer"))?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Customer not found".into()));
    }
    tracing::info!(id, "customer deactivated");
    Ok(message("Customer deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_composes_filters_search_and_limit() {
        let req = ModuleRequest::new("GET", "/customers")
            .with_query("status", "active")
            .with_query("search", "ann")
            .with_query("limit", "20");
        let (sql, args) = list_query(&req, ListLimits::default()).unwrap();
        assert_eq!(
            sql,
            format!(
                "SELECT {} FROM customers WHERE 1=1 AND status = $1 AND (first_name ILIKE $2 OR last_name ILIKE $2 \
                 OR company_name ILIKE $2 OR email ILIKE $2) ORDER BY created_at DESC LIMIT 20",
                CUSTOMER_COLUMNS
            )
        );
        assert_eq!(args, vec![SqlArg::from("active"), SqlArg::from("%ann%")]);
    }

    #[test]
    fn list_without_filters_uses_default_limit() {
        let req = ModuleRequest::new("GET", "/customers").with_query("status", "");
        let (sql, args) = list_query(&req, ListLimits::default()).unwrap();
        assert_eq!(
            sql,
            format!("SELECT {} FROM customers WHERE 1=1 ORDER BY created_at DESC LIMIT 50", CUSTOMER_COLUMNS)
        );
        assert!(args.is_empty());

        let req = ModuleRequest::new("GET", "/customers").with_query("limit", "99999");
        let (sql, _) = list_query(&req, ListLimits::default()).unwrap();
        assert!(sql.ends_with("LIMIT 1000"));
    }

    #[test]
    fn update_binds_the_id_after_the_fields() {
        let update: CustomerUpdate =
            serde_json::from_str(r#"{"first_name": "Ann", "notes": null, "unknown": 1}"#).unwrap();
        let (sql, args) = update_query(7, &update).unwrap();
        assert_eq!(
            sql,
            "UPDATE customers SET first_name = $1, notes = $2, updated_at = NOW() WHERE id = $3"
        );
        assert_eq!(
            args,
            vec![SqlArg::from("Ann"), SqlArg::Text(None), SqlArg::Int(Some(7))]
        );
    }

    #[test]
    fn update_with_nothing_known_is_rejected() {
        let update: CustomerUpdate = serde_json::from_str(r#"{"website": "x"}"#).unwrap();
        assert_eq!(update_query(7, &update), Err(QueryError::NoUpdatableFields));
    }
}
