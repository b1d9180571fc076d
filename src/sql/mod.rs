//! Safe SQL builder: identifiers always quoted, values always parameters.

mod builder;
pub mod params;
pub mod row;
pub use builder::*;
pub use params::*;
