use std::{path::Path, time::Duration};

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App, AppState,
};

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io error while serving: {0}")]
    Io(#[from] std::io::Error),
}

/// The core async function returning a future that will serve this application.
///
/// Accepts an `App` holding the `TcpListener` and the `AppState`.
///
/// Current implementation might return an IO error from `axum::serve`
pub async fn serve(app: App) -> Result<(), ServeError> {
    let App {
        app_state,
        listener,
        static_dir,
    } = app;

    axum::serve(listener, router(app_state, static_dir)).await?;

    Ok(())
}

/// Builds the full application `Router`: all routes plus the middleware stack.
pub fn router(app_state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = build_trace_layer();

    Router::new().merge(routes(app_state, static_dir)).layer(
        ServiceBuilder::new()
            // Set UUID per request
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            // Copies the id onto every response on its way out, including the ones
            // rebuilt by the response mapper or produced by the panic handler below.
            .layer(PropagateRequestIdLayer::new(x_request_id))
            // A panicking handler still answers with the normalized 500 body.
            // Layers below keep working with plain `Body` responses.
            .layer(CatchPanicLayer::custom(midware::handle_panic))
            .layer(trace_layer)
            // Innermost, it sees the handler's response first and may replace it.
            .layer(middleware::map_response(midware::response_mapper)),
    )
}

/// A helper function that sets up the `tower_http::TraceLayer`.
/// Every request gets a span carrying its id, and the final status is recorded on it.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(|_req: &Request<Body>, _s: &Span| tracing::debug!("request started"))
        .on_response(log_response)
}

fn request_span(req: &Request<Body>) -> Span {
    let req_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        req_id,
        method = %req.method(),
        path = req.uri().path(),
        status = tracing::field::Empty,
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());

    if status.is_server_error() {
        tracing::error!(?latency, "request failed")
    } else if status.is_client_error() {
        tracing::warn!(?latency, "request rejected")
    } else {
        tracing::info!(?latency, "request finished")
    }
}
