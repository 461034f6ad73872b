//! Positional arguments that keep their PostgreSQL type, even when NULL.

use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value bound to a `$n` placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlArg {
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
}

impl SqlArg {
    pub fn is_null(&self) -> bool {
        match self {
            SqlArg::Text(v) => v.is_none(),
            SqlArg::Int(v) => v.is_none(),
            SqlArg::BigInt(v) => v.is_none(),
            SqlArg::Float(v) => v.is_none(),
            SqlArg::Bool(v) => v.is_none(),
        }
    }
}

impl From<&str> for SqlArg {
    fn from(v: &str) -> Self {
        SqlArg::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(Some(v))
    }
}

impl From<i32> for SqlArg {
    fn from(v: i32) -> Self {
        SqlArg::Int(Some(v))
    }
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::BigInt(Some(v))
    }
}

impl From<f64> for SqlArg {
    fn from(v: f64) -> Self {
        SqlArg::Float(Some(v))
    }
}

impl From<bool> for SqlArg {
    fn from(v: bool) -> Self {
        SqlArg::Bool(Some(v))
    }
}

/// Decides whether an optional filter was actually supplied.
/// Empty strings, zero integers and `None` are absent.
pub trait FilterValue {
    fn into_arg(self) -> Option<SqlArg>;
}

impl FilterValue for &str {
    fn into_arg(self) -> Option<SqlArg> {
        (!self.is_empty()).then(|| SqlArg::from(self))
    }
}

impl FilterValue for String {
    fn into_arg(self) -> Option<SqlArg> {
        (!self.is_empty()).then(|| SqlArg::from(self))
    }
}

impl FilterValue for &String {
    fn into_arg(self) -> Option<SqlArg> {
        self.as_str().into_arg()
    }
}

impl FilterValue for i32 {
    fn into_arg(self) -> Option<SqlArg> {
        (self != 0).then(|| SqlArg::from(self))
    }
}

impl FilterValue for i64 {
    fn into_arg(self) -> Option<SqlArg> {
        (self != 0).then(|| SqlArg::from(self))
    }
}

impl FilterValue for SqlArg {
    fn into_arg(self) -> Option<SqlArg> {
        (!self.is_null()).then_some(self)
    }
}

impl<T: FilterValue> FilterValue for Option<T> {
    fn into_arg(self) -> Option<SqlArg> {
        self.and_then(FilterValue::into_arg)
    }
}

impl<'q> Encode<'q, Postgres> for SqlArg {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            SqlArg::Text(v) => <Option<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlArg::Int(v) => <Option<i32> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlArg::BigInt(v) => <Option<i64> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlArg::Float(v) => <Option<f64> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlArg::Bool(v) => <Option<bool> as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlArg::Text(_) => <String as Type<Postgres>>::type_info(),
            SqlArg::Int(_) => <i32 as Type<Postgres>>::type_info(),
            SqlArg::BigInt(_) => <i64 as Type<Postgres>>::type_info(),
            SqlArg::Float(_) => <f64 as Type<Postgres>>::type_info(),
            SqlArg::Bool(_) => <bool as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for SqlArg {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_filters_are_absent() {
        assert_eq!("".into_arg(), None);
        assert_eq!(String::new().into_arg(), None);
        assert_eq!(0i32.into_arg(), None);
        assert_eq!(None::<&str>.into_arg(), None);
        assert_eq!(Some("").into_arg(), None);
        assert_eq!(SqlArg::Int(None).into_arg(), None);
    }

    #[test]
    fn supplied_filters_keep_their_type() {
        assert_eq!("active".into_arg(), Some(SqlArg::Text(Some("active".into()))));
        assert_eq!(Some(7i32).into_arg(), Some(SqlArg::Int(Some(7))));
        assert_eq!(7i64.into_arg(), Some(SqlArg::BigInt(Some(7))));
    }
}
