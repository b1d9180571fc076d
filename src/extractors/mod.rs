//! Axum extractors.

mod request;
