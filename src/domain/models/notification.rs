//! Typed notifications delivered over the per-topic notification streams.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::types::{TweetId, UserId};

/// Category of a notification. Each category is its own stream per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Like,
    Follow,
    Retweet,
    Reply,
    Mention,
}

impl NotificationType {
    pub const ALL: [NotificationType; 5] = [
        Self::Like,
        Self::Follow,
        Self::Retweet,
        Self::Reply,
        Self::Mention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Retweet => "retweet",
            Self::Reply => "reply",
            Self::Mention => "mention",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a path segment does not name a notification type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notification type: {0}")]
pub struct UnknownNotificationType(pub String);

impl FromStr for NotificationType {
    type Err = UnknownNotificationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNotificationType(s.to_string()))
    }
}

/// A notification addressed to `target_user_id`, caused by `author_user_id`.
///
/// Built by the write path right before it is published and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Recipient.
    pub target_user_id: UserId,
    pub target_tweet_id: Option<TweetId>,
    /// Actor.
    pub author_user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        target_user_id: UserId,
        author_user_id: UserId,
        target_tweet_id: Option<TweetId>,
        kind: NotificationType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target_user_id,
            target_tweet_id,
            author_user_id,
            kind,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification_type() {
        for kind in NotificationType::ALL {
            assert_eq!(kind.as_str().parse::<NotificationType>(), Ok(kind));
        }
        assert_eq!(
            "likes".parse::<NotificationType>(),
            Err(UnknownNotificationType("likes".to_string()))
        );
    }

    #[test]
    fn test_notification_json_shape() {
        let notification = Notification::new(
            UserId::new("target"),
            UserId::new("author"),
            None,
            NotificationType::Follow,
        );
        let value = serde_json::to_value(&notification).unwrap();

        assert_eq!(value["target_user_id"], "target");
        assert_eq!(value["author_user_id"], "author");
        assert!(value["target_tweet_id"].is_null());
        assert_eq!(value["type"], "follow");
        assert_eq!(value["is_read"], false);
        assert!(value["created_at"].is_string());
        assert!(Uuid::parse_str(value["id"].as_str().unwrap()).is_ok());
    }
}
