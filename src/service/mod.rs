//! CRUD functions over one table, plus the "exactly one row" helper they share.

mod crud;
mod require;
pub use crud::{CrudFn, CrudFunctions, DatabaseCrud, FetchAllFn};
pub use require::RequireSome;
