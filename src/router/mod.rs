//! Bidirectional routers: one value both matches requests into routes and prints routes
//! back into requests.
//!
//! A `Router<A>` is built by chaining small pieces (method, literal segments, parameters,
//! bodies) and finally projecting into a route enum with [`Router::case`]:
//!
//! ```
//! use web_utils::case_path;
//! use web_utils::router::{routes, RequestData, Router};
//! use axum::http::Method;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Route {
//!     List,
//!     Show { id: i64 },
//! }
//!
//! let router = routes([
//!     Router::get().path("todos").case(case_path!(Route::List)).end(),
//!     Router::get()
//!         .path("todos")
//!         .path_param::<i64>()
//!         .case(case_path!(Route::Show { id }))
//!         .end(),
//! ]);
//!
//! let request = RequestData::new(Method::GET, "/todos/3");
//! assert_eq!(router.match_request(&request), Some(Route::Show { id: 3 }));
//! assert_eq!(router.request_for(&Route::Show { id: 3 }), Some(request));
//! ```

mod case_path;
mod param;
mod request;
mod syntax;

pub use case_path::CasePath;
pub use param::{PathSegments, RouteParam};
pub use request::RequestData;
pub use syntax::{end, json_body, lit, method, path_param, query_param};

use axum::body::Bytes;
use axum::http::{Method, Uri};
use std::sync::Arc;

type Parse<A> = dyn Fn(&mut RequestData) -> Option<A> + Send + Sync;
type Print<A> = dyn Fn(&A) -> Option<RequestData> + Send + Sync;

pub struct Router<A> {
    parse: Arc<Parse<A>>,
    print: Arc<Print<A>>,
}

impl<A> Clone for Router<A> {
    fn clone(&self) -> Self {
        Router {
            parse: self.parse.clone(),
            print: self.print.clone(),
        }
    }
}

/// A conversion that may fail in both directions.
pub struct PartialIso<A, B> {
    apply: Arc<dyn Fn(A) -> Option<B> + Send + Sync>,
    unapply: Arc<dyn Fn(&B) -> Option<A> + Send + Sync>,
}

impl<A, B> Clone for PartialIso<A, B> {
    fn clone(&self) -> Self {
        PartialIso {
            apply: self.apply.clone(),
            unapply: self.unapply.clone(),
        }
    }
}

impl<A, B> PartialIso<A, B> {
    pub fn new<F, G>(apply: F, unapply: G) -> Self
    where
        F: Fn(A) -> Option<B> + Send + Sync + 'static,
        G: Fn(&B) -> Option<A> + Send + Sync + 'static,
    {
        PartialIso {
            apply: Arc::new(apply),
            unapply: Arc::new(unapply),
        }
    }

    pub fn apply(&self, a: A) -> Option<B> {
        (self.apply)(a)
    }

    pub fn unapply(&self, b: &B) -> Option<A> {
        (self.unapply)(b)
    }
}

impl<Root: 'static, Value: 'static> From<CasePath<Root, Value>> for PartialIso<Value, Root> {
    fn from(case: CasePath<Root, Value>) -> Self {
        let extract = case.clone();
        PartialIso::new(move |v| Some(case.embed(v)), move |root| extract.extract(root))
    }
}

impl<A: 'static> Router<A> {
    pub fn new<P, Q>(parse: P, print: Q) -> Self
    where
        P: Fn(&mut RequestData) -> Option<A> + Send + Sync + 'static,
        Q: Fn(&A) -> Option<RequestData> + Send + Sync + 'static,
    {
        Router {
            parse: Arc::new(parse),
            print: Arc::new(print),
        }
    }

    /// Matches nothing and prints nothing.
    pub fn empty() -> Self {
        Router::new(|_| None, |_| None)
    }

    /// Match a request. Unconsumed path segments are allowed unless the router ends with [`Router::end`].
    pub fn match_request(&self, request: &RequestData) -> Option<A> {
        let mut request = request.clone();
        (self.parse)(&mut request)
    }

    pub fn match_http(&self, method: &Method, uri: &Uri, body: Bytes) -> Option<A> {
        self.match_request(&RequestData::from_parts(method, uri, body))
    }

    /// The request that would match `route`, if this router can describe it.
    pub fn request_for(&self, route: &A) -> Option<RequestData> {
        (self.print)(route)
    }

    pub fn url_for(&self, route: &A) -> Option<String> {
        self.request_for(route).map(|r| r.uri())
    }

    /// Try `self`, then `other`. The first alternative to match wins.
    pub fn or(self, other: Router<A>) -> Router<A> {
        let (lp, rp) = (self.parse.clone(), other.parse.clone());
        let (lq, rq) = (self.print, other.print);
        Router::new(
            move |request| {
                let mut attempt = request.clone();
                if let Some(a) = lp(&mut attempt) {
                    *request = attempt;
                    return Some(a);
                }
                let mut attempt = request.clone();
                let a = rp(&mut attempt)?;
                *request = attempt;
                Some(a)
            },
            move |a| lq(a).or_else(|| rq(a)),
        )
    }

    pub fn map<B: 'static>(self, iso: PartialIso<A, B>) -> Router<B> {
        let unapply = iso.clone();
        let (parse, print) = (self.parse, self.print);
        Router::new(
            move |request| parse(request).and_then(|a| iso.apply(a)),
            move |b| unapply.unapply(b).and_then(|a| print(&a)),
        )
    }

    /// Project into one case of a route enum.
    pub fn case<R: 'static>(self, case: CasePath<R, A>) -> Router<R> {
        self.map(case.into())
    }

    /// Parse `self` then `rhs`, keeping both values.
    pub fn tuple<B: 'static>(self, rhs: Router<B>) -> Router<(A, B)> {
        let (lp, lq) = (self.parse, self.print);
        let (rp, rq) = (rhs.parse, rhs.print);
        Router::new(
            move |request| {
                let a = lp(request)?;
                let b = rp(request)?;
                Some((a, b))
            },
            move |(a, b)| Some(lq(a)?.merge(rq(b)?)),
        )
    }

    /// Parse `self` then `rhs`, keeping only the left value.
    pub fn skip(self, rhs: Router<()>) -> Router<A> {
        let (lp, lq) = (self.parse, self.print);
        let (rp, rq) = (rhs.parse, rhs.print);
        Router::new(
            move |request| {
                let a = lp(request)?;
                rp(request)?;
                Some(a)
            },
            move |a| Some(lq(a)?.merge(rq(&())?)),
        )
    }

    /// Require every path segment to be consumed.
    ///
    /// Without it a route matches any request whose path merely starts with its own, so in a
    /// list of alternatives `GET /test` would swallow `GET /test/42`.
    pub fn end(self) -> Router<A> {
        self.skip(end())
    }
}

impl Router<()> {
    /// Parse `self` then `rhs`, keeping only the right value.
    pub fn then<B: 'static>(self, rhs: Router<B>) -> Router<B> {
        let (lp, lq) = (self.parse, self.print);
        let (rp, rq) = (rhs.parse, rhs.print);
        Router::new(
            move |request| {
                lp(request)?;
                rp(request)
            },
            move |b| Some(lq(&())?.merge(rq(b)?)),
        )
    }
}

/// Combine alternatives in declaration order.
pub fn routes<A: 'static>(alternatives: impl IntoIterator<Item = Router<A>>) -> Router<A> {
    alternatives
        .into_iter()
        .reduce(Router::or)
        .unwrap_or_else(Router::empty)
}
