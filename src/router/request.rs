//! The request shape routers match against and print into.

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{self, header, Method, Uri};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::VecDeque;

/// Characters escaped inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Method, remaining path segments, query pairs and body of a request.
///
/// Matching consumes `path` from the front; printing produces a fresh value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestData {
    pub method: Option<Method>,
    pub path: VecDeque<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl RequestData {
    /// Parse a request target such as `test/1?foo=bar`. Empty segments are dropped,
    /// so `/test`, `//test` and `test` are the same path.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        RequestData {
            method: Some(method),
            path: parse_path(path),
            query: query.map(parse_query).unwrap_or_default(),
            body: None,
        }
    }

    pub fn from_parts(method: &Method, uri: &Uri, body: Bytes) -> Self {
        RequestData {
            method: Some(method.clone()),
            path: parse_path(uri.path()),
            query: uri.query().map(parse_query).unwrap_or_default(),
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append `other`: the first method and body win, path and query concatenate.
    pub fn merge(mut self, other: RequestData) -> Self {
        if self.method.is_none() {
            self.method = other.method;
        }
        self.path.extend(other.path);
        self.query.extend(other.query);
        if self.body.is_none() {
            self.body = other.body;
        }
        self
    }

    /// `/seg/seg?key=value`, escaped.
    pub fn uri(&self) -> String {
        let mut out = String::from("/");
        let segments: Vec<String> = self
            .path
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        out.push_str(&segments.join("/"));
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(
                &form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&self.query)
                    .finish(),
            );
        }
        out
    }

    /// Build an HTTP request carrying the same method, target and body.
    pub fn into_request(self) -> Result<Request, axum::http::Error> {
        let mut builder = http::Request::builder()
            .method(self.method.clone().unwrap_or(Method::GET))
            .uri(self.uri());
        let body = match self.body {
            Some(bytes) => {
                builder = builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, bytes.len());
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        builder.body(body)
    }
}

fn parse_path(path: &str) -> VecDeque<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}
