use std::sync::Arc;

use axum::{extract::Extension, response::Response};
use tracing::info;

use crate::inbounds::auth::AuthUser;
use crate::inbounds::AppState;

use super::stream::event_stream;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - stream_feed                                          |
/// +----------------------------------------------------------+

/// `GET /api/feed`: streams tweet-lifecycle events to the authenticated user.
///
/// # Flow
///
/// 1. Resolves the caller (401 without any subscription when absent)
/// 2. Subscribes to the feed broker
/// 3. Hands the subscription to a streaming task that lives as long as the connection
pub async fn stream_feed(
    AuthUser(user_id): AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    info!(user = %user_id, "Opening feed stream");
    let subscription = state.feed.subscribe(user_id);
    event_stream(subscription)
}
