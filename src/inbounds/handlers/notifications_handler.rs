use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
};
use tracing::info;

use crate::domain::models::NotificationType;
use crate::inbounds::api_error::ApiResult;
use crate::inbounds::auth::AuthUser;
use crate::inbounds::AppState;

use super::stream::event_stream;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - stream_notifications                                 |
/// +----------------------------------------------------------+

/// `GET /api/notifications/:type`: streams one notification type to the authenticated user.
///
/// # Error Handling
///
/// * Missing identity is rejected with 401 by the `AuthUser` extractor
/// * Unknown notification types are rejected with 400
///
/// Both happen before any subscription exists.
pub async fn stream_notifications(
    AuthUser(user_id): AuthUser,
    Path(kind): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Response> {
    let kind: NotificationType = kind.parse()?;
    info!(user = %user_id, %kind, "Opening notification stream");
    let subscription = state.notifications.subscribe(kind, user_id);
    Ok(event_stream(subscription))
}
