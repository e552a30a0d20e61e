/// Profile endpoint
///
/// ```text
/// PUT /users/me
/// Authorization: Bearer <access token>
///
/// { "name": "Ada Lovelace", "email": "ada@example.org" }
/// ```
///
/// Both fields are optional; omitted or null fields keep their stored value.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use serde_json::Value;
use taskwell_shared::{
    auth::gate::Principal,
    models::user::{UpdateProfile, User},
    validation::{
        account::{validate_email, validate_text, TextRules},
        Validated,
    },
};
use tracing::info;

fn validate_profile(body: &Value) -> Validated<UpdateProfile> {
    let name = validate_text(body.get("name"), TextRules::display_name(false));
    let email = match body.get("email") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => validate_email(raw.as_str()).map(Some),
    };

    match (name, email) {
        (Ok(name), Ok(email)) => Ok(UpdateProfile { name, email }),
        (name, email) => Err([name.err(), email.err()]
            .into_iter()
            .flatten()
            .flatten()
            .collect()),
    }
}

/// Updates the signed-in user's name and/or email
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or validation failed
/// - `404 Not Found`: The user no longer exists
/// - `409 Conflict`: The new email belongs to another user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<ApiResponse<User>> {
    let changes = validate_profile(&body).map_err(ApiError::validation)?;

    let user = User::update_profile(&state.db, principal.user_id, changes)
        .await
        .map_err(ApiError::operation("update profile"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = user.id, "Profile updated");
    Ok(ApiResponse::ok(user).with_message("Profile updated successfully"))
}
