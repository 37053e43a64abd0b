use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
};

use crate::error::AppError;
use crate::http::params::QueryParams;
use crate::http::request::RequestInfo;
use crate::http::response::{JsonSink, ResponseSink};
use crate::http::server::AppState;

pub async fn monitor(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let request = RequestInfo::from_parts(&method, &uri, &headers);
    let params = QueryParams::parse(query.as_deref());
    let reporting = state.reporting.clone();
    let info = request.clone();

    state
        .instrumentation
        .run(request, JsonSink, move || async move { reporting.monitor(&params, &info) })
        .await
}

/// Not instrumented: health polls never enter the request window.
pub async fn health(State(state): State<AppState>) -> Response {
    let reply = state.reporting.health();
    tracing::debug!(status = %reply.status, "Health check served");
    JsonSink.send(reply.status, reply.body)
}

pub async fn not_found(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request = RequestInfo::from_parts(&method, &uri, &headers);
    let message = format!("Route {} {} not found", request.method, request.path);

    state
        .instrumentation
        .run(request, JsonSink, move || async move { Err(AppError::not_found(message).into()) })
        .await
}

pub async fn method_not_allowed(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request = RequestInfo::from_parts(&method, &uri, &headers);
    let message = format!("Method {} not allowed on {}", request.method, request.path);

    state
        .instrumentation
        .run(request, JsonSink, move || async move {
            Err(AppError::method_not_allowed(message).into())
        })
        .await
}
