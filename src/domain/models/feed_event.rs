//! Tweet-lifecycle events delivered over the per-user activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{TweetWithAuthor, UserId};

/// What happened to the tweet carried by a [`FeedEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedEventType {
    Created,
    Liked,
    Retweeted,
}

/// A tweet-lifecycle event. Constructed fresh per publish and dropped after delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    #[serde(rename = "type")]
    pub kind: FeedEventType,
    pub tweet: TweetWithAuthor,
    /// The user who performed the action.
    pub actor_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl FeedEvent {
    pub fn new(kind: FeedEventType, tweet: TweetWithAuthor, actor_id: UserId) -> Self {
        Self {
            kind,
            tweet,
            actor_id,
            created_at: Utc::now(),
        }
    }

    /// The author of the tweet this event is about.
    pub fn tweet_author(&self) -> &UserId {
        &self.tweet.author.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::types::{Tweet, User};

    #[test]
    fn test_feed_event_json_shape() {
        let author = User::new("alice", Some("Alice".to_string()));
        let tweet = Tweet::new(author.id.clone(), "first", None);
        let event = FeedEvent::new(
            FeedEventType::Liked,
            TweetWithAuthor::new(tweet, &author),
            UserId::new("bob"),
        );
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "liked");
        assert_eq!(value["actor_id"], "bob");
        assert_eq!(value["tweet"]["content"], "first");
        assert_eq!(value["tweet"]["author"]["display_name"], "Alice");
        assert_eq!(event.tweet_author(), &author.id);
    }
}
