use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::models::UserId;
use crate::inbounds::api_error::ApiResult;
use crate::inbounds::auth::AuthUser;
use crate::inbounds::dtos::RegisterUserRequest;
use crate::inbounds::AppState;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - register_user                                        |
/// |   - follow_user                                          |
/// |   - unfollow_user                                        |
/// +----------------------------------------------------------+

/// `POST /api/users`
pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> ApiResult<Response> {
    let user = state
        .activity
        .register_user(&req.username, req.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// `POST /api/users/:id/follow`
pub async fn follow_user(
    AuthUser(user_id): AuthUser,
    Path(target): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state
        .activity
        .follow_user(&user_id, &UserId::new(target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/users/:id/unfollow`
pub async fn unfollow_user(
    AuthUser(user_id): AuthUser,
    Path(target): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state
        .activity
        .unfollow_user(&user_id, &UserId::new(target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
