//! Turn driver rows into JSON objects so any `Deserialize` record can be decoded from them.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};

pub fn row_to_json(row: &AnyRow) -> Value {
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &AnyRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(name) {
        return Value::Array(bytes.into_iter().map(|b| Value::Number(b.into())).collect());
    }
    Value::Null
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrBool {
    Bool(bool),
    Int(i64),
}

/// Decode a flag stored as `INTEGER` 0/1 (SQLite) or as a native `BOOLEAN` (Postgres).
///
/// The `Any` driver rejects SQLite's `BOOLEAN` column type, so SQLite tables keep flags in
/// `INTEGER` columns and records opt in with
/// `#[serde(deserialize_with = "web_utils::sql::row::bool_from_int")]`.
pub fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IntOrBool::deserialize(deserializer)? {
        IntOrBool::Bool(b) => b,
        IntOrBool::Int(n) => n != 0,
    })
}
