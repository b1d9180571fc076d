//! Response writing: the [`Conn`] typestate and JSON middleware over it.

mod conn;
mod json;

pub use conn::{BodyOpen, Conn, HeadersOpen, ResponseEnded, StatusLineOpen};
pub use json::JsonFormat;
