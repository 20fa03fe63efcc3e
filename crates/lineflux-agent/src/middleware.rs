//! Axum middleware driving the instrumentation hooks.
//!
//! `on_request_start` runs before the inner service sees the request.
//! `on_request_finish` runs once the response body has been streamed to the
//! end, or dropped by the server (client gone, HEAD), error statuses included.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use tokio::time::Instant;

use lineflux_core::Instrumentation;

pub async fn track_requests(
    State(hooks): State<Instrumentation>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_owned();
    let route = req.uri().path().to_owned();

    hooks.on_request_start(&method);
    let start = Instant::now();

    let resp = next.run(req).await;

    let finish = Finish {
        hooks,
        start,
        route,
        method,
    };
    resp.map(|body| {
        Body::from_stream(TrackedBody {
            inner: body.into_data_stream().boxed(),
            finish: Some(finish),
        })
    })
}

/// Attach the hooks to an application router.
pub fn instrument<S>(router: Router<S>, hooks: Instrumentation) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(hooks, track_requests))
}

struct Finish {
    hooks: Instrumentation,
    start: Instant,
    route: String,
    method: String,
}

/// Response body that reports the request as finished exactly once.
struct TrackedBody {
    inner: BoxStream<'static, Result<Bytes, axum::Error>>,
    finish: Option<Finish>,
}

impl TrackedBody {
    fn finish(&mut self) {
        if let Some(f) = self.finish.take() {
            f.hooks
                .on_request_finish(f.start.elapsed(), &f.route, &f.method);
        }
    }
}

impl Stream for TrackedBody {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = ready!(self.inner.poll_next_unpin(cx));
        if !matches!(item, Some(Ok(_))) {
            self.finish();
        }
        Poll::Ready(item)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.finish();
    }
}
