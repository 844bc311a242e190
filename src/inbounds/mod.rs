//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the HTTP surface using Axum: the write endpoints that feed the brokers
// and the two streaming endpoints that drain them.
//
// | Component      | Description                                                |
// |----------------|-----------------------------------------------------------|
// | Api            | Router construction and server lifecycle                   |
// | AppState       | Brokers and services shared by all handlers                |
// | Handlers       | Handler functions for API endpoints                        |
// | Auth           | Authenticated-user extraction                              |
// | DTOs           | Data transfer objects for API requests/responses           |
//--------------------------------------------------------------------------------------------------

/// Error types for the inbound API layer.
pub mod api_error;

/// Authenticated-user resolution.
pub mod auth;

/// Data transfer objects for API requests and responses.
pub mod dtos;

/// Request handlers.
pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::{Config, WILDCARD_ORIGIN};
use crate::domain::services::activity::ActivityService;
use crate::domain::services::feed::FeedBroker;
use crate::domain::services::notifications::NotificationBroker;
use crate::outbounds::store::SocialStore;

use auth::{Authenticator, HeaderAuthenticator};
use handlers::{
    feed_handler, health_handler, inbox_handler, notifications_handler, tweet_handler,
    user_handler,
};

/// Shared application state accessible by all handlers
pub struct AppState {
    pub notifications: NotificationBroker,
    pub feed: FeedBroker,
    pub activity: ActivityService,
}

impl AppState {
    /// Creates the brokers from `config` and wires the write path to them.
    pub fn new(store: Arc<dyn SocialStore>, config: &Config) -> Self {
        let notifications = NotificationBroker::new(config.channel_capacity);
        let feed = FeedBroker::new(config.channel_capacity, config.feed_delivery);
        let activity = ActivityService::new(store, notifications.clone(), feed.clone());
        Self {
            notifications,
            feed,
            activity,
        }
    }

    /// Closes both brokers, ending every open stream.
    pub fn shutdown(&self) {
        self.feed.close();
        self.notifications.close();
    }
}

/// Main API structure
pub struct Api {
    /// API address
    addr: SocketAddr,
    /// Shared application state
    state: Arc<AppState>,
    authenticator: Arc<dyn Authenticator>,
    cors_origins: Vec<HeaderValue>,
    auth_header: HeaderName,
}

impl Api {
    /// Creates a new API instance that trusts `config.auth_header` for the caller's identity.
    pub fn new(config: &Config, state: Arc<AppState>) -> Self {
        let auth_header = config.auth_header.clone();
        let cors_origins = config
            .cors_origins
            .iter()
            .filter_map(|origin| {
                if origin == WILDCARD_ORIGIN {
                    warn!("Ignoring wildcard CORS origin, credentialed requests need explicit origins");
                    return None;
                }
                match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                }
            })
            .collect();

        Self {
            addr: config.bind_addr,
            state,
            authenticator: Arc::new(HeaderAuthenticator::new(auth_header.clone())),
            cors_origins,
            auth_header,
        }
    }

    /// Replaces the authenticator installed on the router.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Creates all routes for the API
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(self.cors_origins.clone())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                self.auth_header.clone(),
            ])
            .allow_credentials(true);

        Router::new()
            .route("/health", get(health_handler::health))
            // Streams
            .route("/api/feed", get(feed_handler::stream_feed))
            .route(
                "/api/notifications/:type",
                get(notifications_handler::stream_notifications),
            )
            // Writes
            .route("/api/users", post(user_handler::register_user))
            .route("/api/users/:id/follow", post(user_handler::follow_user))
            .route("/api/users/:id/unfollow", post(user_handler::unfollow_user))
            .route("/api/tweets", post(tweet_handler::create_tweet))
            .route("/api/tweets/:id/quote", post(tweet_handler::quote_tweet))
            .route("/api/tweets/:id/like", post(tweet_handler::like_tweet))
            .route("/api/tweets/:id/unlike", post(tweet_handler::unlike_tweet))
            .route("/api/tweets/:id/retweet", post(tweet_handler::retweet))
            .route("/api/tweets/:id/unretweet", post(tweet_handler::unretweet))
            // Inbox
            .route("/api/inbox", get(inbox_handler::list_notifications))
            .route("/api/inbox/:id/read", post(inbox_handler::mark_read))
            .layer(Extension(self.state.clone()))
            .layer(Extension(self.authenticator.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Serves until `shutdown` resolves, then closes the brokers so open streams end and the
    /// server can drain.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.routes();
        let state = self.state.clone();

        let listener = TcpListener::bind(self.addr).await?;
        info!("API listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown requested, closing event streams");
                state.shutdown();
            })
            .await?;

        info!("API stopped");
        Ok(())
    }
}
