//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types shared by the write path and the fan-out layer:
// identifiers, users, tweets and the tweet-with-author projection embedded in feed events.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | IDS                | Newtype identifiers for users and tweets.                        |
// | STRUCTS            | User, Tweet and the TweetWithAuthor display projection.          |
// | TESTS              | Contains unit tests for the defined types.                       |
//--------------------------------------------------------------------------------------------------

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//--------------------------------------------------------------------------------------------------
//  IDS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                               |
// |---------------|-------------------------------------------|
// | UserId        | Opaque identifier of a user.              |
// | TweetId       | Opaque identifier of a tweet.             |
//--------------------------------------------------------------------------------------------------

/// Opaque identifier of a user, as resolved from the authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque identifier of a tweet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(String);

impl TweetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TweetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                             |
// |-----------------|---------------------------------------------------------|
// | User            | A registered account.                                   |
// | Tweet           | A stored tweet with its counters.                       |
// | TweetAuthor     | The author fields shown next to a tweet.                |
// | TweetWithAuthor | Tweet plus author, the payload of every feed event.     |
//--------------------------------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub is_verified: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub tweets_count: u64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            display_name,
            is_verified: false,
            followers_count: 0,
            following_count: 0,
            tweets_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// A stored tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    /// Parent tweet when this tweet is a reply.
    pub reply_to: Option<TweetId>,
    /// Quoted tweet when this tweet is a quote.
    pub quote_of: Option<TweetId>,
    pub likes_count: u64,
    pub retweets_count: u64,
    pub replies_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(author_id: UserId, content: impl Into<String>, reply_to: Option<TweetId>) -> Self {
        let now = Utc::now();
        Self {
            id: TweetId::generate(),
            author_id,
            content: content.into(),
            reply_to,
            quote_of: None,
            likes_count: 0,
            retweets_count: 0,
            replies_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks this tweet as quoting `original`.
    pub fn quoting(mut self, original: TweetId) -> Self {
        self.quote_of = Some(original);
        self
    }

    /// Usernames referenced as `@name` in the content, deduplicated, in order of appearance.
    pub fn mentioned_usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for word in self.content.split_whitespace() {
            let Some(rest) = word.strip_prefix('@') else {
                continue;
            };
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Author fields shown next to a tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetAuthor {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub is_verified: bool,
}

impl From<&User> for TweetAuthor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            is_verified: user.is_verified,
        }
    }
}

/// Snapshot of a tweet and its author, as embedded in feed events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetWithAuthor {
    #[serde(flatten)]
    pub tweet: Tweet,
    pub author: TweetAuthor,
}

impl TweetWithAuthor {
    pub fn new(tweet: Tweet, author: &User) -> Self {
        Self {
            tweet,
            author: TweetAuthor::from(author),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let id = UserId::new("u1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
    }

    #[test]
    fn test_mentioned_usernames() {
        let tweet = Tweet::new(
            UserId::new("u1"),
            "hey @alice and @bob_2, also @alice again. email a@b and @",
            None,
        );
        assert_eq!(tweet.mentioned_usernames(), vec!["alice", "bob_2"]);
    }

    #[test]
    fn test_tweet_with_author_flattens_tweet_fields() {
        let author = User::new("alice", None);
        let tweet = Tweet::new(author.id.clone(), "hello", None);
        let value = serde_json::to_value(TweetWithAuthor::new(tweet.clone(), &author)).unwrap();

        assert_eq!(value["id"], tweet.id.as_str());
        assert_eq!(value["content"], "hello");
        assert_eq!(value["author"]["username"], "alice");
    }
}
