// Expose the modules
pub mod config;
pub mod domain;
pub mod inbounds;
pub mod outbounds;

// Re-export key types for easier usage
pub use config::Config;
pub use domain::models::{
    FeedEvent, FeedEventType, Notification, NotificationType, Tweet, TweetId, TweetWithAuthor,
    User, UserId,
};
pub use domain::services::activity::{ActivityError, ActivityService};
pub use domain::services::feed::{FeedBroker, FeedDelivery};
pub use domain::services::notifications::{NotificationBroker, NotificationKey};
pub use domain::services::registry::{EventRegistry, PublishReport, Subscription, SubscriptionId};
pub use inbounds::{Api, AppState};
pub use outbounds::store::{InMemorySocialStore, SocialStore, StoreError};
