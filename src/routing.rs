//! Mount a bidirectional [`Router`] on axum.

use crate::response::{Conn, ResponseEnded, StatusLineOpen};
use crate::router::{RequestData, Router};
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::future::Future;

/// Serve every request through `router`.
///
/// A matched route is handed to `handler` as a fresh [`Conn`]; anything else gets a plain
/// `404 Not Found`. The result can be nested or merged like any other `axum::Router`.
pub fn route<R, H, Fut>(router: Router<R>, handler: H) -> axum::Router
where
    R: Send + 'static,
    H: Fn(Conn<StatusLineOpen, R>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Conn<ResponseEnded, Bytes>> + Send + 'static,
{
    axum::Router::new().fallback(move |request: RequestData| {
        let router = router.clone();
        let handler = handler.clone();
        async move {
            match router.match_request(&request) {
                Some(route) => handler(Conn::new(route)).await.into_response(),
                None => {
                    tracing::debug!(method = ?request.method, uri = %request.uri(), "no route matched");
                    (StatusCode::NOT_FOUND, "Not Found").into_response()
                }
            }
        }
    })
}
