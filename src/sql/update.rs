//! SET clause construction for partial updates, restricted to an allow-list of columns.

use crate::error::QueryError;
use crate::sql::builder::PlaceholderAllocator;
use crate::sql::params::SqlArg;
use serde::{Deserialize, Deserializer};

/// Fragments of `name = $k` and the arguments bound to them.
#[derive(Clone, Debug, PartialEq)]
pub struct SetClause {
    pub fragments: Vec<String>,
    pub args: Vec<SqlArg>,
    /// Index for the first placeholder after the SET list (the row identifier).
    pub next_index: usize,
}

impl SetClause {
    pub fn to_sql(&self) -> String {
        self.fragments.join(", ")
    }
}

pub struct WhitelistUpdateBuilder;

impl WhitelistUpdateBuilder {
    /// Keeps only fields named in `allowed`; others are dropped silently.
    /// A field repeated in the input is bound once, using its first value.
    pub fn build<I, K>(fields: I, allowed: &[&'static str], start_index: usize) -> Result<SetClause, QueryError>
    where
        I: IntoIterator<Item = (K, SqlArg)>,
        K: AsRef<str>,
    {
        let mut placeholders = PlaceholderAllocator::new(start_index);
        let mut seen: Vec<&'static str> = Vec::new();
        let mut fragments = Vec::new();
        let mut args = Vec::new();
        for (name, value) in fields {
            let Some(column) = allowed.iter().copied().find(|c| *c == name.as_ref()) else {
                continue;
            };
            if seen.contains(&column) {
                continue;
            }
            seen.push(column);
            fragments.push(format!("{} = ${}", column, placeholders.allocate()));
            args.push(value);
        }
        if fragments.is_empty() {
            return Err(QueryError::NoUpdatableFields);
        }
        Ok(SetClause {
            fragments,
            args,
            next_index: placeholders.peek(),
        })
    }
}

/// Columns a client may change through `PUT /customers/{id}`.
pub const CUSTOMER_UPDATABLE: &[&str] = &[
    "company_name",
    "first_name",
    "last_name",
    "email",
    "phone",
    "mobile",
    "status",
    "credit_limit",
    "notes",
];

/// Sparse update payload: `None` = not sent, `Some(None)` = set to NULL.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default, deserialize_with = "present")]
    pub company_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub mobile: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub credit_limit: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CustomerUpdate {
    /// Fields that were sent, in column order.
    pub fn fields(&self) -> Vec<(&'static str, SqlArg)> {
        let text = [
            ("company_name", &self.company_name),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("mobile", &self.mobile),
            ("status", &self.status),
        ];
        let mut out: Vec<(&'static str, SqlArg)> = text
            .into_iter()
            .filter_map(|(name, v)| v.clone().map(|v| (name, SqlArg::Text(v))))
            .collect();
        if let Some(v) = self.credit_limit {
            out.push(("credit_limit", SqlArg::Float(v)));
        }
        if let Some(v) = &self.notes {
            out.push(("notes", SqlArg::Text(v.clone())));
        }
        out
    }

    pub fn set_clause(&self) -> Result<SetClause, QueryError> {
        WhitelistUpdateBuilder::build(self.fields(), CUSTOMER_UPDATABLE, 1)
    }
}
