/// Success envelope
///
/// Successful responses share one shape:
///
/// ```json
/// { "success": true, "message": "Task created successfully", "data": { ... } }
/// ```
///
/// `message` is omitted when there is nothing to say.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of a successful response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessBody<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub data: T,
}

/// A success envelope with its status code
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: SuccessBody<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: SuccessBody {
                success: true,
                message: None,
                data,
            },
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
