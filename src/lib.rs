//! Web utils: declarative bidirectional routes, CRUD functions over SQL tables and JSON
//! responses, for axum and sqlx.

pub mod db;
pub mod error;
pub mod extractors;
pub mod response;
pub mod router;
pub mod routing;
pub mod service;
pub mod sql;

pub use error::{ApiError, CrudError, RequireSomeError};
pub use response::{Conn, JsonFormat, ResponseEnded, StatusLineOpen};
pub use router::{routes, CasePath, PartialIso, RequestData, Router};
pub use routing::route;
pub use service::{CrudFunctions, DatabaseCrud, RequireSome};
