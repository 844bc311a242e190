use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    Json,
};

use crate::domain::models::Notification;
use crate::inbounds::api_error::ApiResult;
use crate::inbounds::auth::AuthUser;
use crate::inbounds::dtos::PageParams;
use crate::inbounds::AppState;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - list_notifications                                   |
/// |   - mark_read                                            |
/// +----------------------------------------------------------+

/// `GET /api/inbox?limit=&offset=`: the caller's stored notifications, newest first.
pub async fn list_notifications(
    AuthUser(user_id): AuthUser,
    Query(page): Query<PageParams>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .activity
        .list_notifications(&user_id, page.limit, page.offset)
        .await?;
    Ok(Json(notifications))
}

/// `POST /api/inbox/:id/read`
pub async fn mark_read(
    AuthUser(user_id): AuthUser,
    Path(notification_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Notification>> {
    let notification = state
        .activity
        .mark_notification_read(&user_id, &notification_id)
        .await?;
    Ok(Json(notification))
}
