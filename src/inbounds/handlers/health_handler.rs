use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::inbounds::dtos::HealthResponse;
use crate::inbounds::AppState;

/// `GET /health`
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        feed_subscribers: state.feed.registry().subscriber_count(),
        notification_subscribers: state.notifications.registry().subscriber_count(),
    })
}
