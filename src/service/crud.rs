//! Generic CRUD functions for one table, built on the SQL builders.

use crate::error::CrudError;
use crate::service::RequireSome;
use crate::sql::{
    delete_builder_with_id_column, fetch_builder, fetch_id_builder_with_id_column, insert_builder,
    update_builder_with_id_column, Column, Identifiable, QueryFetcher, Table, ALL,
    DEFAULT_ID_COLUMN,
};
use futures_util::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::AnyPool;
use std::fmt::Debug;
use std::sync::Arc;

/// An async database operation taking one input.
pub type CrudFn<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, CrudError>> + Send + Sync>;

/// An async database operation taking no input.
pub type FetchAllFn<M> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<M>, CrudError>> + Send + Sync>;

/// Factory for the common CRUD functions of one table.
///
/// Each factory method returns a function that captures its own copy of the table and the pool
/// handle. Every call of such a function is a fresh round trip; nothing is cached.
#[derive(Clone, Debug)]
pub struct DatabaseCrud {
    table: Table,
    db: AnyPool,
    id_column: Column,
}

impl DatabaseCrud {
    pub fn new(table: impl Into<Table>, db: AnyPool) -> Self {
        DatabaseCrud {
            table: table.into(),
            db,
            id_column: Column::new(DEFAULT_ID_COLUMN),
        }
    }

    /// Key column used by `delete`, `fetch_id` and `update`. Defaults to `"id"`.
    pub fn with_id_column(mut self, column: impl Into<Column>) -> Self {
        self.id_column = column.into();
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn db(&self) -> &AnyPool {
        &self.db
    }

    /// Delete a row by id. Deleting a missing id is not an error.
    pub fn delete<ID>(&self) -> CrudFn<ID, ()>
    where
        ID: Serialize + Send + 'static,
    {
        let this = self.clone();
        Arc::new(move |id: ID| {
            let this = this.clone();
            async move {
                delete_builder_with_id_column(&id, this.table.clone(), this.id_column.clone())?
                    .run(&this.db)
                    .await?;
                Ok::<_, CrudError>(())
            }
            .boxed()
        })
    }

    /// Fetch every row, ordered by the id column.
    pub fn fetch<M>(&self) -> FetchAllFn<M>
    where
        M: DeserializeOwned + Send + 'static,
    {
        let this = self.clone();
        Arc::new(move || {
            let this = this.clone();
            async move {
                fetch_builder(this.table.clone())
                    .order_by(this.id_column.clone())
                    .all::<M>(&this.db)
                    .await
            }
            .boxed()
        })
    }

    /// Fetch one row by id; zero rows is a [`RequireSomeError`](crate::error::RequireSomeError).
    pub fn fetch_id<ID, M>(&self) -> CrudFn<ID, M>
    where
        ID: Serialize + Debug + Send + 'static,
        M: DeserializeOwned + Send + 'static,
    {
        let this = self.clone();
        Arc::new(move |id: ID| {
            let this = this.clone();
            async move {
                fetch_id_builder_with_id_column(&id, this.table.clone(), this.id_column.clone())?
                    .first::<M>(&this.db)
                    .await
                    .require_some(format!("fetch_id: {} : {:?}", this.table, id))
            }
            .boxed()
        })
    }

    /// Insert a record and return the stored row, including server-assigned columns.
    pub fn insert<I, M>(&self) -> CrudFn<I, M>
    where
        I: Serialize + Debug + Send + 'static,
        M: DeserializeOwned + Send + 'static,
    {
        let this = self.clone();
        Arc::new(move |request: I| {
            let this = this.clone();
            async move {
                insert_builder(&request, this.table.clone())?
                    .returning([ALL])
                    .first::<M>(&this.db)
                    .await
                    .require_some(format!("insert: {} : {:?}", this.table, request))
            }
            .boxed()
        })
    }

    /// Update a record by its own id and return the changed row.
    pub fn update<U, M>(&self) -> CrudFn<U, M>
    where
        U: Serialize + Identifiable + Debug + Send + 'static,
        M: DeserializeOwned + Send + 'static,
    {
        let this = self.clone();
        Arc::new(move |request: U| {
            let this = this.clone();
            async move {
                update_builder_with_id_column(&request, this.table.clone(), this.id_column.clone())?
                    .returning([ALL])
                    .first::<M>(&this.db)
                    .await
                    .require_some(format!("update: {} : {:?}", this.table, request.id()))
            }
            .boxed()
        })
    }

    /// All five functions at once.
    pub fn functions<ID, M, I, U>(&self) -> CrudFunctions<ID, M, I, U>
    where
        ID: Serialize + Debug + Send + 'static,
        M: DeserializeOwned + Send + 'static,
        I: Serialize + Debug + Send + 'static,
        U: Serialize + Identifiable + Debug + Send + 'static,
    {
        CrudFunctions {
            delete: self.delete(),
            fetch_all: self.fetch(),
            fetch_id: self.fetch_id(),
            insert: self.insert(),
            update: self.update(),
        }
    }
}

/// The CRUD functions of one table. They share only the pool handle.
pub struct CrudFunctions<ID, M, I, U = M> {
    pub delete: CrudFn<ID, ()>,
    pub fetch_all: FetchAllFn<M>,
    pub fetch_id: CrudFn<ID, M>,
    pub insert: CrudFn<I, M>,
    pub update: CrudFn<U, M>,
}

impl<ID, M, I, U> Clone for CrudFunctions<ID, M, I, U> {
    fn clone(&self) -> Self {
        CrudFunctions {
            delete: self.delete.clone(),
            fetch_all: self.fetch_all.clone(),
            fetch_id: self.fetch_id.clone(),
            insert: self.insert.clone(),
            update: self.update.clone(),
        }
    }
}
