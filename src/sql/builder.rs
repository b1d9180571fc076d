//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from identifiers and serde records.

use crate::error::CrudError;
use crate::sql::params::SqlValue;
use crate::sql::row::row_to_json;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::any::{Any, AnyArguments};
use sqlx::AnyPool;
use sqlx::query::Query;
use std::fmt;

/// Column name that selects every column when used in a column list.
pub const ALL: &str = "*";

/// Column used by the `*_builder` helpers when none is given.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// A table or column name, optionally schema-qualified. Always rendered quoted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SqlIdentifier {
    parts: Vec<String>,
}

pub type Table = SqlIdentifier;
pub type Column = SqlIdentifier;

impl SqlIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        SqlIdentifier {
            parts: vec![name.into()],
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        SqlIdentifier {
            parts: vec![schema.into(), name.into()],
        }
    }

    pub fn all() -> Self {
        Self::new(ALL)
    }

    /// Unquoted last component.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

/// Quote identifier (embedded quotes doubled). `*` stays bare.
fn quoted(s: &str) -> String {
    if s == ALL {
        return ALL.to_string();
    }
    format!("\"{}\"", s.replace('"', "\"\""))
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(|p| quoted(p)).collect();
        f.write_str(&rendered.join("."))
    }
}

impl From<&str> for SqlIdentifier {
    fn from(s: &str) -> Self {
        SqlIdentifier::new(s)
    }
}

impl From<String> for SqlIdentifier {
    fn from(s: String) -> Self {
        SqlIdentifier::new(s)
    }
}

impl From<&SqlIdentifier> for SqlIdentifier {
    fn from(s: &SqlIdentifier) -> Self {
        s.clone()
    }
}

/// A record that knows its own primary key.
pub trait Identifiable {
    type Id: Serialize + fmt::Debug;

    fn id(&self) -> Self::Id;
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Placeholder for `v`, or the `NULL` literal.
    fn push_param(&mut self, v: &SqlValue) -> String {
        if v.is_null() {
            return "NULL".to_string();
        }
        self.params.push(v.clone());
        format!("${}", self.params.len())
    }

    fn where_clause(&mut self, filters: &[(Column, SqlValue)]) -> String {
        if filters.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = filters
            .iter()
            .map(|(col, val)| {
                if val.is_null() {
                    format!("{} IS NULL", col)
                } else {
                    let ph = self.push_param(val);
                    format!("{} = {}", col, ph)
                }
            })
            .collect();
        format!(" WHERE {}", parts.join(" AND "))
    }

    fn bound(&self) -> Query<'_, Any, AnyArguments<'_>> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |query, p| p.bind_to(query))
    }

    /// Execute, returning the number of affected rows.
    pub async fn execute(&self, db: &AnyPool) -> Result<u64, CrudError> {
        tracing::debug!(sql = %self.sql, params = ?self.params, "query");
        let result = self.bound().execute(db).await?;
        Ok(result.rows_affected())
    }

    pub async fn fetch_all_json(&self, db: &AnyPool) -> Result<Vec<Value>, CrudError> {
        tracing::debug!(sql = %self.sql, params = ?self.params, "query");
        let rows = self.bound().fetch_all(db).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    pub async fn fetch_optional_json(&self, db: &AnyPool) -> Result<Option<Value>, CrudError> {
        tracing::debug!(sql = %self.sql, params = ?self.params, "query");
        let row = self.bound().fetch_optional(db).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

fn decode<M: DeserializeOwned>(v: Value) -> Result<M, CrudError> {
    serde_json::from_value(v).map_err(CrudError::Decode)
}

fn column_list(columns: &[Column]) -> String {
    if columns.is_empty() {
        return ALL.to_string();
    }
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn returning_clause(columns: &Option<Vec<Column>>) -> String {
    match columns {
        Some(cols) => format!(" RETURNING {}", column_list(cols)),
        None => String::new(),
    }
}

/// Serialize a record into (column, value) pairs, sorted by column. The record must be a JSON object.
pub fn model_columns<T: Serialize + ?Sized>(model: &T) -> Result<Vec<(Column, SqlValue)>, CrudError> {
    match serde_json::to_value(model).map_err(CrudError::Encode)? {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            fields
                .into_iter()
                .map(|(k, v)| Ok((Column::new(k.as_str()), SqlValue::from_json(v)?)))
                .collect()
        }
        Value::Null => Err(CrudError::NotAnObject("null")),
        Value::Bool(_) => Err(CrudError::NotAnObject("bool")),
        Value::Number(_) => Err(CrudError::NotAnObject("number")),
        Value::String(_) => Err(CrudError::NotAnObject("string")),
        Value::Array(_) => Err(CrudError::NotAnObject("array")),
    }
}

/// Anything that renders to a statement, with helpers to run it.
#[async_trait]
pub trait QueryFetcher {
    fn query(&self) -> QueryBuf;

    async fn run(&self, db: &AnyPool) -> Result<u64, CrudError> {
        self.query().execute(db).await
    }

    async fn all<M>(&self, db: &AnyPool) -> Result<Vec<M>, CrudError>
    where
        M: DeserializeOwned + Send,
    {
        let rows = self.query().fetch_all_json(db).await?;
        rows.into_iter().map(decode).collect()
    }

    async fn first<M>(&self, db: &AnyPool) -> Result<Option<M>, CrudError>
    where
        M: DeserializeOwned + Send,
    {
        let row = self.query().fetch_optional_json(db).await?;
        row.map(decode).transpose()
    }
}

#[derive(Clone, Debug)]
pub struct SelectBuilder {
    table: Table,
    columns: Vec<Column>,
    filters: Vec<(Column, SqlValue)>,
    order_by: Vec<Column>,
    limit: Option<u64>,
}

impl SelectBuilder {
    pub fn new(table: impl Into<Table>) -> Self {
        SelectBuilder {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn where_eq(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<Column>) -> Self {
        self.order_by.push(column.into());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
}

impl QueryFetcher for SelectBuilder {
    fn query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        let where_clause = q.where_clause(&self.filters);
        let order_clause = if self.order_by.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", column_list(&self.order_by))
        };
        let limit_clause = self.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
        q.sql = format!(
            "SELECT {} FROM {}{}{}{}",
            column_list(&self.columns),
            self.table,
            where_clause,
            order_clause,
            limit_clause
        );
        q
    }
}

#[derive(Clone, Debug)]
pub struct DeleteBuilder {
    table: Table,
    filters: Vec<(Column, SqlValue)>,
    returning: Option<Vec<Column>>,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<Table>) -> Self {
        DeleteBuilder {
            table: table.into(),
            filters: Vec::new(),
            returning: None,
        }
    }

    pub fn where_eq(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn returning<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.returning = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

impl QueryFetcher for DeleteBuilder {
    fn query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        let where_clause = q.where_clause(&self.filters);
        q.sql = format!(
            "DELETE FROM {}{}{}",
            self.table,
            where_clause,
            returning_clause(&self.returning)
        );
        q
    }
}

#[derive(Clone, Debug)]
pub struct InsertBuilder {
    table: Table,
    values: Vec<(Column, SqlValue)>,
    returning: Option<Vec<Column>>,
}

impl InsertBuilder {
    pub fn new(table: impl Into<Table>) -> Self {
        InsertBuilder {
            table: table.into(),
            values: Vec::new(),
            returning: None,
        }
    }

    pub fn value(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Insert the fields of a serialized record. Null fields are omitted so column defaults apply.
    pub fn model<T: Serialize + ?Sized>(mut self, model: &T) -> Result<Self, CrudError> {
        let values = model_columns(model)?;
        self.values
            .extend(values.into_iter().filter(|(_, v)| !v.is_null()));
        Ok(self)
    }

    pub fn returning<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.returning = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

impl QueryFetcher for InsertBuilder {
    fn query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        let returning = returning_clause(&self.returning);
        if self.values.is_empty() {
            q.sql = format!("INSERT INTO {} DEFAULT VALUES{}", self.table, returning);
            return q;
        }
        let cols: Vec<String> = self.values.iter().map(|(c, _)| c.to_string()).collect();
        let placeholders: Vec<String> = self.values.iter().map(|(_, v)| q.push_param(v)).collect();
        q.sql = format!(
            "INSERT INTO {} ({}) VALUES ({}){}",
            self.table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        );
        q
    }
}

#[derive(Clone, Debug)]
pub struct UpdateBuilder {
    table: Table,
    sets: Vec<(Column, SqlValue)>,
    filters: Vec<(Column, SqlValue)>,
    returning: Option<Vec<Column>>,
}

impl UpdateBuilder {
    pub fn new(table: impl Into<Table>) -> Self {
        UpdateBuilder {
            table: table.into(),
            sets: Vec::new(),
            filters: Vec::new(),
            returning: None,
        }
    }

    pub fn set(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.sets.push((column.into(), value.into()));
        self
    }

    /// SET every field of a serialized record except `skip` (normally the id column).
    /// Null fields are written as NULL.
    pub fn set_model<T: Serialize + ?Sized>(
        mut self,
        model: &T,
        skip: &Column,
    ) -> Result<Self, CrudError> {
        let values = model_columns(model)?;
        self.sets
            .extend(values.into_iter().filter(|(c, _)| c.name() != skip.name()));
        Ok(self)
    }

    pub fn where_eq(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn returning<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.returning = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

impl QueryFetcher for UpdateBuilder {
    fn query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        if self.sets.is_empty() {
            // Nothing to write: read the row back instead.
            let cols = self.returning.as_deref().unwrap_or_default();
            let where_clause = q.where_clause(&self.filters);
            q.sql = format!("SELECT {} FROM {}{}", column_list(cols), self.table, where_clause);
            return q;
        }
        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|(c, v)| {
                let rhs = q.push_param(v);
                format!("{} = {}", c, rhs)
            })
            .collect();
        let where_clause = q.where_clause(&self.filters);
        q.sql = format!(
            "UPDATE {} SET {}{}{}",
            self.table,
            sets.join(", "),
            where_clause,
            returning_clause(&self.returning)
        );
        q
    }
}

/// DELETE ... WHERE "id" = $1.
pub fn delete_builder<ID>(id: &ID, table: impl Into<Table>) -> Result<DeleteBuilder, CrudError>
where
    ID: Serialize + ?Sized,
{
    delete_builder_with_id_column(id, table, DEFAULT_ID_COLUMN)
}

pub fn delete_builder_with_id_column<ID>(
    id: &ID,
    table: impl Into<Table>,
    id_column: impl Into<Column>,
) -> Result<DeleteBuilder, CrudError>
where
    ID: Serialize + ?Sized,
{
    Ok(DeleteBuilder::new(table).where_eq(id_column, SqlValue::from_serialize(id)?))
}

/// SELECT * FROM table. Used to fetch all / a list of rows.
pub fn fetch_builder(table: impl Into<Table>) -> SelectBuilder {
    SelectBuilder::new(table)
}

/// SELECT * FROM table WHERE "id" = $1.
pub fn fetch_id_builder<ID>(id: &ID, table: impl Into<Table>) -> Result<SelectBuilder, CrudError>
where
    ID: Serialize + ?Sized,
{
    fetch_id_builder_with_id_column(id, table, DEFAULT_ID_COLUMN)
}

pub fn fetch_id_builder_with_id_column<ID>(
    id: &ID,
    table: impl Into<Table>,
    id_column: impl Into<Column>,
) -> Result<SelectBuilder, CrudError>
where
    ID: Serialize + ?Sized,
{
    Ok(fetch_builder(table).where_eq(id_column, SqlValue::from_serialize(id)?))
}

/// INSERT INTO table (..fields of model..) VALUES (..).
pub fn insert_builder<T>(model: &T, table: impl Into<Table>) -> Result<InsertBuilder, CrudError>
where
    T: Serialize + ?Sized,
{
    InsertBuilder::new(table).model(model)
}

/// UPDATE table SET (..fields of model..) WHERE "id" = model.id().
pub fn update_builder<T>(model: &T, table: impl Into<Table>) -> Result<UpdateBuilder, CrudError>
where
    T: Serialize + Identifiable,
{
    update_builder_with_id_column(model, table, DEFAULT_ID_COLUMN)
}

pub fn update_builder_with_id_column<T>(
    model: &T,
    table: impl Into<Table>,
    id_column: impl Into<Column>,
) -> Result<UpdateBuilder, CrudError>
where
    T: Serialize + Identifiable,
{
    let id_column = id_column.into();
    let id = SqlValue::from_serialize(&model.id())?;
    Ok(UpdateBuilder::new(table)
        .set_model(model, &id_column)?
        .where_eq(id_column, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Todo {
        id: i64,
        title: String,
        note: Option<String>,
    }

    impl Identifiable for Todo {
        type Id = i64;

        fn id(&self) -> i64 {
            self.id
        }
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(SqlIdentifier::new("todo").to_string(), "\"todo\"");
        assert_eq!(SqlIdentifier::qualified("app", "todo").to_string(), "\"app\".\"todo\"");
        assert_eq!(SqlIdentifier::new("we\"ird").to_string(), "\"we\"\"ird\"");
        assert_eq!(SqlIdentifier::all().to_string(), "*");
    }

    #[test]
    fn fetch_selects_all_columns() {
        let q = fetch_builder("todo").query();
        assert_eq!(q.sql, "SELECT * FROM \"todo\"");
        assert!(q.params.is_empty());
    }

    #[test]
    fn fetch_id_binds_the_id() {
        let q = fetch_id_builder(&7, "todo").unwrap().columns(["id", "title"]).query();
        assert_eq!(q.sql, "SELECT \"id\", \"title\" FROM \"todo\" WHERE \"id\" = $1");
        assert_eq!(q.params, vec![SqlValue::I64(7)]);
    }

    #[test]
    fn select_with_order_and_limit() {
        let q = fetch_builder("todo")
            .where_eq("title", "a")
            .where_eq("note", SqlValue::Null)
            .order_by("id")
            .limit(10)
            .query();
        assert_eq!(
            q.sql,
            "SELECT * FROM \"todo\" WHERE \"title\" = $1 AND \"note\" IS NULL ORDER BY \"id\" LIMIT 10"
        );
        assert_eq!(q.params, vec![SqlValue::Text("a".into())]);
    }

    #[test]
    fn delete_by_id() {
        let q = delete_builder_with_id_column(&"abc", "todo", "uuid").unwrap().query();
        assert_eq!(q.sql, "DELETE FROM \"todo\" WHERE \"uuid\" = $1");
        assert_eq!(q.params, vec![SqlValue::Text("abc".into())]);
    }

    #[test]
    fn insert_omits_null_fields() {
        let todo = Todo { id: 1, title: "write".into(), note: None };
        let q = insert_builder(&todo, "todo").unwrap().returning([ALL]).query();
        assert_eq!(
            q.sql,
            "INSERT INTO \"todo\" (\"id\", \"title\") VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(q.params, vec![SqlValue::I64(1), SqlValue::Text("write".into())]);
    }

    #[test]
    fn insert_of_empty_record_uses_defaults() {
        #[derive(Serialize)]
        struct Empty {}
        let q = insert_builder(&Empty {}, "todo").unwrap().query();
        assert_eq!(q.sql, "INSERT INTO \"todo\" DEFAULT VALUES");
    }

    #[test]
    fn insert_rejects_non_objects() {
        let err = insert_builder(&5, "todo").unwrap_err();
        assert!(matches!(err, CrudError::NotAnObject("number")));
    }

    #[test]
    fn update_skips_id_and_writes_nulls() {
        let todo = Todo { id: 3, title: "done".into(), note: None };
        let q = update_builder(&todo, "todo").unwrap().returning([ALL]).query();
        assert_eq!(
            q.sql,
            "UPDATE \"todo\" SET \"note\" = NULL, \"title\" = $1 WHERE \"id\" = $2 RETURNING *"
        );
        assert_eq!(q.params, vec![SqlValue::Text("done".into()), SqlValue::I64(3)]);
    }

    #[test]
    fn update_without_fields_reads_row_back() {
        let q = UpdateBuilder::new("todo").where_eq("id", 3).query();
        assert_eq!(q.sql, "SELECT * FROM \"todo\" WHERE \"id\" = $1");
    }
}
