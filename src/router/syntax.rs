//! Building blocks and the fluent syntax for describing routes.

use super::param::{PathSegments, RouteParam};
use super::request::RequestData;
use super::Router;
use axum::body::Bytes;
use axum::http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Match a request method.
pub fn method(method: Method) -> Router<()> {
    let printed = method.clone();
    Router::new(
        move |request| (request.method.as_ref() == Some(&method)).then_some(()),
        move |_| {
            Some(RequestData {
                method: Some(printed.clone()),
                ..Default::default()
            })
        },
    )
}

/// Match one literal path segment exactly.
pub fn lit(segment: impl Into<String>) -> Router<()> {
    let segment = segment.into();
    let printed = segment.clone();
    Router::new(
        move |request| {
            if request.path.front() != Some(&segment) {
                return None;
            }
            request.path.pop_front();
            Some(())
        },
        move |_| {
            Some(RequestData {
                path: [printed.clone()].into(),
                ..Default::default()
            })
        },
    )
}

/// Match one path segment that parses as `B`.
pub fn path_param<B: RouteParam + 'static>() -> Router<B> {
    Router::new(
        |request| {
            let value = B::from_param(request.path.front()?)?;
            request.path.pop_front();
            Some(value)
        },
        |value| {
            // an empty segment would print a URL this parser cannot match
            let segment = value.to_param();
            if segment.is_empty() {
                return None;
            }
            Some(RequestData {
                path: [segment].into(),
                ..Default::default()
            })
        },
    )
}

/// Read an optional query parameter. A present value that does not parse fails the match.
pub fn query_param<B: RouteParam + 'static>(key: &str) -> Router<Option<B>> {
    let key = key.to_string();
    let printed = key.clone();
    Router::new(
        move |request| match request.query.iter().find(|(k, _)| *k == key) {
            None => Some(None),
            Some((_, v)) => B::from_param(v).map(Some),
        },
        move |value| {
            let query = match value {
                Some(v) => vec![(printed.clone(), v.to_param())],
                None => Vec::new(),
            };
            Some(RequestData {
                query,
                ..Default::default()
            })
        },
    )
}

/// Decode the request body as JSON.
pub fn json_body<B>() -> Router<B>
where
    B: Serialize + DeserializeOwned + 'static,
{
    Router::new(
        |request| {
            let body = request.body.as_ref()?;
            match serde_json::from_slice(body) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "json body did not decode");
                    None
                }
            }
        },
        |value| {
            let bytes = serde_json::to_vec(value).ok()?;
            Some(RequestData {
                body: Some(Bytes::from(bytes)),
                ..Default::default()
            })
        },
    )
}

/// Succeeds only when no path segments remain.
pub fn end() -> Router<()> {
    Router::new(
        |request| request.path.is_empty().then_some(()),
        |_| Some(RequestData::default()),
    )
}

// Methods
impl Router<()> {
    /// Create a router matching on a `DELETE` request.
    pub fn delete() -> Self {
        method(Method::DELETE)
    }

    /// Create a router matching on a `GET` request.
    pub fn get() -> Self {
        method(Method::GET)
    }

    /// Create a router matching on a `HEAD` request.
    pub fn head() -> Self {
        method(Method::HEAD)
    }

    /// Create a router matching on an `OPTIONS` request.
    pub fn options() -> Self {
        method(Method::OPTIONS)
    }

    /// Create a router matching on a `PATCH` request.
    pub fn patch() -> Self {
        method(Method::PATCH)
    }

    /// Create a router matching on a `POST` request.
    pub fn post() -> Self {
        method(Method::POST)
    }

    /// Create a router matching on a `PUT` request.
    pub fn put() -> Self {
        method(Method::PUT)
    }
}

// Path, parameters and bodies
impl Router<()> {
    /// Match literal segments. `"/test"`, `"//test"` and `"test"` are the same segment;
    /// `None` or an empty list leaves the router unchanged.
    pub fn path(self, segments: impl PathSegments) -> Router<()> {
        segments
            .segments()
            .into_iter()
            .fold(self, |router, segment| router.then(lit(segment)))
    }

    pub fn path_param<B: RouteParam + 'static>(self) -> Router<B> {
        self.then(path_param())
    }

    pub fn query_param<B: RouteParam + 'static>(self, key: &str) -> Router<Option<B>> {
        self.then(query_param(key))
    }

    pub fn json_body<B>(self) -> Router<B>
    where
        B: Serialize + DeserializeOwned + 'static,
    {
        self.then(json_body())
    }

    /// Parse two values into a pair, e.g. `tuple_of(path_param::<i64>(), json_body::<T>())`.
    pub fn tuple_of<B: 'static, C: 'static>(self, lhs: Router<B>, rhs: Router<C>) -> Router<(B, C)> {
        self.then(lhs.tuple(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Body {
        name: String,
    }

    #[test]
    fn method_must_match() {
        let router = Router::post();
        assert_eq!(router.match_request(&RequestData::new(Method::POST, "/")), Some(()));
        assert_eq!(router.match_request(&RequestData::new(Method::GET, "/")), None);
    }

    #[test]
    fn end_rejects_trailing_segments() {
        let open = Router::get().path("test");
        let closed = Router::get().path("test").end();
        let request = RequestData::new(Method::GET, "test/extra");
        assert_eq!(open.match_request(&request), Some(()));
        assert_eq!(closed.match_request(&request), None);
    }

    #[test]
    fn query_params_are_optional_but_typed() {
        let router = Router::get().path("search").query_param::<u32>("page").end();
        assert_eq!(router.match_request(&RequestData::new(Method::GET, "search")), Some(None));
        assert_eq!(
            router.match_request(&RequestData::new(Method::GET, "search?page=2")),
            Some(Some(2))
        );
        assert_eq!(router.match_request(&RequestData::new(Method::GET, "search?page=x")), None);
        assert_eq!(router.url_for(&None), Some("/search".to_string()));
        assert_eq!(router.url_for(&Some(3)), Some("/search?page=3".to_string()));
    }

    #[test]
    fn json_bodies_decode_and_print() {
        let router = Router::post().path("items").json_body::<Body>().end();
        let body = Body { name: "blob".into() };
        let request = router.request_for(&body).unwrap();
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"blob"}"#[..]));
        assert_eq!(router.match_request(&request), Some(body));

        let missing = RequestData::new(Method::POST, "items");
        assert_eq!(router.match_request(&missing), None);
        let garbage = RequestData::new(Method::POST, "items").with_body("not json");
        assert_eq!(router.match_request(&garbage), None);
    }

    #[test]
    fn tuple_of_pairs_values() {
        let router = Router::put()
            .path("items")
            .tuple_of(path_param::<i64>(), json_body::<Body>())
            .end();
        let value = (4, Body { name: "x".into() });
        let request = router.request_for(&value).unwrap();
        assert_eq!(request.uri(), "/items/4");
        assert_eq!(router.match_request(&request), Some(value));
    }
}
