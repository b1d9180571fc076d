//! JSON response writing on top of [`Conn`].

use super::conn::{Conn, HeadersOpen, ResponseEnded, StatusLineOpen};
use crate::error::ApiError;
use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::panic::Location;

const BADLY_FORMED_JSON: &str = "Badly formed json";

/// How response bodies are encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JsonFormat {
    #[default]
    Compact,
    /// Sorted keys, pretty printed. Stable output for asserting on bodies.
    Testing,
}

impl JsonFormat {
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            JsonFormat::Compact => serde_json::to_vec(value),
            JsonFormat::Testing => {
                let mut value = serde_json::to_value(value)?;
                sort_keys(&mut value);
                serde_json::to_vec_pretty(&value)
            }
        }
    }
}

// `Map` keeps insertion order once serde_json's `preserve_order` feature is enabled anywhere in the build.
fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, v) in entries.iter_mut() {
                sort_keys(v);
            }
            map.extend(entries);
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

#[derive(Serialize)]
struct Empty {}

impl<A: Serialize> Conn<StatusLineOpen, A> {
    /// Encode the carried value as a `200` JSON body, or a plain-text `400` when it does not encode.
    pub fn respond_json(self, format: JsonFormat) -> Conn<ResponseEnded, Bytes> {
        match format.encode(self.data()) {
            Ok(body) => self.write_status(StatusCode::OK).write_body("application/json", body),
            Err(e) => {
                tracing::warn!(error = %e, "response body failed to encode");
                self.write_status(StatusCode::BAD_REQUEST).badly_formed()
            }
        }
    }
}

impl<A: Serialize> Conn<HeadersOpen, A> {
    /// Encode the carried value as JSON, keeping the status already written.
    pub fn respond_json(self, format: JsonFormat) -> Conn<ResponseEnded, Bytes> {
        match format.encode(self.data()) {
            Ok(body) => self.write_body("application/json", body),
            Err(e) => {
                tracing::warn!(error = %e, "response body failed to encode");
                self.badly_formed()
            }
        }
    }
}

impl<A> Conn<HeadersOpen, A> {
    fn write_body(self, content_type: &'static str, body: Vec<u8>) -> Conn<ResponseEnded, Bytes> {
        self.write_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .write_header(header::CONTENT_LENGTH, HeaderValue::from(body.len()))
            .close_headers()
            .send(body)
            .end()
    }

    fn badly_formed(self) -> Conn<ResponseEnded, Bytes> {
        self.write_body("text/plain; charset=utf-8", BADLY_FORMED_JSON.as_bytes().to_vec())
    }
}

impl<A> Conn<StatusLineOpen, A> {
    /// Await `result` and respond with its value, or with a `500` [`ApiError`] naming the caller.
    #[track_caller]
    pub fn respond_json_result<T, E, F>(
        self,
        result: F,
        format: JsonFormat,
    ) -> impl Future<Output = Conn<ResponseEnded, Bytes>>
    where
        F: Future<Output = Result<T, E>>,
        T: Serialize,
        E: fmt::Debug + fmt::Display,
    {
        let location = Location::caller();
        async move {
            match result.await {
                Ok(value) => self.map(|_| value).respond_json(format),
                Err(e) => {
                    let error = ApiError::with_location(&e, location);
                    tracing::error!(
                        error = %error.message,
                        file = %error.file,
                        line = error.line,
                        "request failed"
                    );
                    self.map(|_| error)
                        .write_status(StatusCode::INTERNAL_SERVER_ERROR)
                        .respond_json(format)
                }
            }
        }
    }

    /// Like [`respond_json_result`](Self::respond_json_result) for operations with no value;
    /// success is `{}`.
    #[track_caller]
    pub fn respond_json_unit<E, F>(
        self,
        result: F,
        format: JsonFormat,
    ) -> impl Future<Output = Conn<ResponseEnded, Bytes>>
    where
        F: Future<Output = Result<(), E>>,
        E: fmt::Debug + fmt::Display,
    {
        self.respond_json_result(async move { result.await.map(|()| Empty {}) }, format)
    }
}
