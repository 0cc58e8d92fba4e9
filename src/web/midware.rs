use std::{any::Any, sync::Arc};

use axum::{
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::web::{log, ClientError, Error, REQUEST_ID_HEADER};

/// Turns errors stashed in the response extensions into the normalized client body,
/// and logs a line for every request.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    headers: HeaderMap,
    resp: Response,
) -> Response {
    let req_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| {
        tracing::error!("REQUEST ERROR: {er:?} ID: {req_id}");
        er.as_ref()
    });
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error
        .as_ref()
        .map(|(status, cl_err)| (*status, Json(cl_err.to_result())).into_response());

    log::log_request(
        &req_id,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    );

    err_resp.unwrap_or(resp)
}

/// Last line of defense, a panicking handler still answers with the normalized 500 body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic message".to_string()
    };
    tracing::error!("HANDLER PANICKED: {details}");

    let body = ClientError::InternalError.to_result();
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
