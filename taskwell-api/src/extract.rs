/// Request extractors
///
/// [`JsonBody`] parses the request body as JSON whatever the
/// `Content-Type` header says, and rejects anything unparseable with the
/// API's invalid-JSON error.

use crate::error::{ApiError, INVALID_JSON};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON request body, accepted with or without `Content-Type: application/json`
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!("Could not read request body: {}", rejection);
            ApiError::BadRequest(INVALID_JSON.to_string())
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            debug!("Rejected request body: {}", e);
            ApiError::BadRequest(INVALID_JSON.to_string())
        })
    }
}
