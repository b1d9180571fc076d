//! Convert serde values to types that the sqlx `Any` driver can bind.

use crate::error::CrudError;
use serde::Serialize;
use serde_json::Value;
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

/// A value that can be bound to a query. Converts from serde_json::Value.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl SqlValue {
    pub fn from_json(v: &Value) -> Result<Self, CrudError> {
        Ok(match v {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::I64(i)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::F64(f)
                } else {
                    // u64 above i64::MAX
                    SqlValue::Text(n.to_string())
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                SqlValue::Text(serde_json::to_string(v).map_err(CrudError::Encode)?)
            }
        })
    }

    /// Serialize any value (ids, filter values) into a bindable value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CrudError> {
        let v = serde_json::to_value(value).map_err(CrudError::Encode)?;
        Self::from_json(&v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Bind onto a query. Nulls are rendered inline by the builders and never reach here.
    pub(crate) fn bind_to<'q>(
        &self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        match self {
            SqlValue::Null => query,
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::I64(n) => query.bind(*n),
            SqlValue::F64(n) => query.bind(*n),
            SqlValue::Text(s) => query.bind(s.clone()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I64(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
