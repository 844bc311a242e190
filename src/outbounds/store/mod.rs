//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the persistence port used by the write path. The production graph database
// adapter lives outside this crate; `InMemorySocialStore` backs the server binary and the tests.
// Besides users, tweets and relationships, the port keeps each user's notification inbox.
//--------------------------------------------------------------------------------------------------

pub mod memory_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Notification, Tweet, TweetId, TweetWithAuthor, User, UserId};

pub use memory_store::InMemorySocialStore;

/// Errors returned by a [`SocialStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced user or tweet does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write collides with existing data (e.g. a taken username).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing database failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result of adding or removing a like or retweet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engagement {
    /// The tweet after the write, with its author.
    pub tweet: TweetWithAuthor,
    /// `false` when the relationship was already in the requested state.
    pub changed: bool,
}

/// Result of a quote tweet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// The new tweet.
    pub quote: TweetWithAuthor,
    /// The quoted tweet, with its bumped retweet counter.
    pub original: TweetWithAuthor,
}

/// Persistence operations the write path depends on.
///
/// Implementations must be thread-safe; handlers call them concurrently.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Stores a new user. Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Stores a new tweet and bumps the author's (and parent's, for replies) counters.
    async fn create_tweet(&self, tweet: Tweet) -> Result<TweetWithAuthor, StoreError>;

    async fn get_tweet(&self, id: &TweetId) -> Result<Option<TweetWithAuthor>, StoreError>;

    /// Records a like of `tweet_id` by `user_id`. Liking twice is not an error.
    async fn like_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;

    /// Records a retweet of `tweet_id` by `user_id`. Retweeting twice is not an error.
    async fn retweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;

    /// Removes a like. Unliking a tweet that was not liked is not an error.
    async fn unlike_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;

    /// Removes a retweet. Unretweeting a tweet that was not retweeted is not an error.
    async fn unretweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;

    /// Stores `tweet` as a quote of `original` and bumps the original's retweet counter.
    async fn quote_tweet(&self, original: &TweetId, tweet: Tweet) -> Result<Quote, StoreError>;

    /// Records that `follower` follows `followee`.
    ///
    /// # Returns
    /// `true` if the relationship is new.
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError>;

    /// # Returns
    /// `true` if a relationship was removed.
    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError>;

    async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError>;

    /// Notifications addressed to `user_id`, newest first.
    async fn list_notifications(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Flags one of `user_id`'s notifications as read. Fails with `NotFound` when the
    /// notification does not exist or is addressed to someone else.
    async fn mark_notification_read(
        &self,
        notification_id: &str,
        user_id: &UserId,
    ) -> Result<Notification, StoreError>;
}

#[cfg(test)]
use mockall::*;

#[cfg(test)]
mock! {
    pub SocialStore {}

    #[async_trait]
    impl SocialStore for SocialStore {
        async fn create_user(&self, user: User) -> Result<User, StoreError>;
        async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
        async fn create_tweet(&self, tweet: Tweet) -> Result<TweetWithAuthor, StoreError>;
        async fn get_tweet(&self, id: &TweetId) -> Result<Option<TweetWithAuthor>, StoreError>;
        async fn like_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;
        async fn retweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;
        async fn unlike_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;
        async fn unretweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError>;
        async fn quote_tweet(&self, original: &TweetId, tweet: Tweet) -> Result<Quote, StoreError>;
        async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError>;
        async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError>;
        async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError>;
        async fn list_notifications(&self, user_id: &UserId, limit: usize, offset: usize) -> Result<Vec<Notification>, StoreError>;
        async fn mark_notification_read(&self, notification_id: &str, user_id: &UserId) -> Result<Notification, StoreError>;
    }
}
