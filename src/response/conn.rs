//! A response under construction, typed by which part of it may still be written.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::marker::PhantomData;

/// The status line has not been written yet.
#[derive(Debug)]
pub struct StatusLineOpen;

/// The status is fixed; headers may still be added.
#[derive(Debug)]
pub struct HeadersOpen;

/// Headers are closed; only the body remains.
#[derive(Debug)]
pub struct BodyOpen;

/// Nothing more can be written.
#[derive(Debug)]
pub struct ResponseEnded;

/// Connection in state `S` carrying `A`: the matched route on entry, the body bytes at the end.
#[derive(Debug)]
pub struct Conn<S, A> {
    data: A,
    status: StatusCode,
    headers: HeaderMap,
    state: PhantomData<S>,
}

impl<S, A> Conn<S, A> {
    pub fn data(&self) -> &A {
        &self.data
    }

    pub fn into_data(self) -> A {
        self.data
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replace the carried value without touching what has been written.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Conn<S, B> {
        Conn {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            state: PhantomData,
        }
    }

    fn transition<T>(self) -> Conn<T, A> {
        Conn {
            data: self.data,
            status: self.status,
            headers: self.headers,
            state: PhantomData,
        }
    }
}

impl<A> Conn<StatusLineOpen, A> {
    pub fn new(data: A) -> Self {
        Conn {
            data,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            state: PhantomData,
        }
    }

    pub fn write_status(mut self, status: StatusCode) -> Conn<HeadersOpen, A> {
        self.status = status;
        self.transition()
    }
}

impl<A> Conn<HeadersOpen, A> {
    /// Set a header, replacing any previous value.
    pub fn write_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn close_headers(self) -> Conn<BodyOpen, A> {
        self.transition()
    }
}

impl<A> Conn<BodyOpen, A> {
    pub fn send(self, body: impl Into<Bytes>) -> Conn<BodyOpen, Bytes> {
        let body = body.into();
        self.map(|_| body)
    }
}

impl Conn<BodyOpen, Bytes> {
    pub fn end(self) -> Conn<ResponseEnded, Bytes> {
        self.transition()
    }
}

impl Conn<ResponseEnded, Bytes> {
    pub fn body(&self) -> &Bytes {
        &self.data
    }
}

impl IntoResponse for Conn<ResponseEnded, Bytes> {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.data));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
