use serde::{Deserialize, Serialize};

use crate::domain::models::TweetId;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Structs:                                                 |
/// |   - RegisterUserRequest                                  |
/// |   - CreateTweetRequest                                   |
/// |   - QuoteTweetRequest                                    |
/// |   - PageParams                                           |
/// |   - HealthResponse                                       |
/// +----------------------------------------------------------+

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Request to post a tweet, optionally as a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,

    /// Tweet being replied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<TweetId>,
}

/// Request to quote a tweet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteTweetRequest {
    pub content: String,
}

/// Default page size of list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 20;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page_size")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub feed_subscribers: usize,
    pub notification_subscribers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tweet_request_reply_is_optional() {
        let plain: CreateTweetRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(plain.reply_to.is_none());

        let reply: CreateTweetRequest =
            serde_json::from_str(r#"{"content":"hi","reply_to":"t1"}"#).unwrap();
        assert_eq!(reply.reply_to, Some(TweetId::new("t1")));
    }

    #[test]
    fn test_page_params_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(
            params,
            PageParams {
                limit: DEFAULT_PAGE_SIZE,
                offset: 0
            }
        );
    }
}
