/// Internal error details in development
///
/// 500 responses carry an [`InternalErrorDetail`] extension holding the
/// underlying error. Outside production this layer copies it into the body
/// as `details`; in production the body is left as rendered.

use crate::{
    app::AppState,
    error::{ErrorDetails, ErrorResponse, InternalErrorDetail},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

pub async fn expose_internal_details(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if state.config.is_production() {
        return response;
    }

    match response.extensions().get::<InternalErrorDetail>().cloned() {
        Some(internal) => with_details(response, internal),
        None => response,
    }
}

fn with_details(response: Response, internal: InternalErrorDetail) -> Response {
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    let body = ErrorResponse {
        error: internal.message,
        details: Some(ErrorDetails::Internal(internal.detail)),
    };

    (parts, Json(body)).into_response()
}
