//! Process-local implementation of [`SocialStore`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::models::{Notification, Tweet, TweetId, TweetWithAuthor, User, UserId};

use super::{Engagement, Quote, SocialStore, StoreError};

#[derive(Debug, Clone, Copy)]
enum Relation {
    Like,
    Retweet,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    tweets: HashMap<TweetId, Tweet>,
    likes: HashSet<(UserId, TweetId)>,
    retweets: HashSet<(UserId, TweetId)>,
    follows: HashSet<(UserId, UserId)>,
    /// Insertion order, oldest first.
    notifications: Vec<Notification>,
}

fn tweet_not_found(id: &TweetId) -> StoreError {
    StoreError::NotFound(format!("tweet {}", id))
}

impl MemoryState {
    fn user(&self, id: &UserId) -> Result<&User, StoreError> {
        self.users
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    fn with_author(&self, tweet: &Tweet) -> Result<TweetWithAuthor, StoreError> {
        let author = self.user(&tweet.author_id)?;
        Ok(TweetWithAuthor::new(tweet.clone(), author))
    }

    fn insert_tweet(&mut self, tweet: Tweet) -> Result<TweetWithAuthor, StoreError> {
        self.user(&tweet.author_id)?;

        if let Some(parent_id) = &tweet.reply_to {
            let parent = self
                .tweets
                .get_mut(parent_id)
                .ok_or_else(|| tweet_not_found(parent_id))?;
            parent.replies_count += 1;
        }

        if let Some(author) = self.users.get_mut(&tweet.author_id) {
            author.tweets_count += 1;
        }
        self.tweets.insert(tweet.id.clone(), tweet.clone());
        self.with_author(&tweet)
    }

    /// Adds (`engaged`) or removes a like or retweet and keeps the tweet's counter in step.
    fn set_engagement(
        &mut self,
        relation: Relation,
        user_id: &UserId,
        tweet_id: &TweetId,
        engaged: bool,
    ) -> Result<Engagement, StoreError> {
        self.user(user_id)?;
        if !self.tweets.contains_key(tweet_id) {
            return Err(tweet_not_found(tweet_id));
        }

        let key = (user_id.clone(), tweet_id.clone());
        let relations = match relation {
            Relation::Like => &mut self.likes,
            Relation::Retweet => &mut self.retweets,
        };
        let changed = if engaged {
            relations.insert(key)
        } else {
            relations.remove(&key)
        };

        let tweet = self
            .tweets
            .get_mut(tweet_id)
            .ok_or_else(|| tweet_not_found(tweet_id))?;
        if changed {
            let counter = match relation {
                Relation::Like => &mut tweet.likes_count,
                Relation::Retweet => &mut tweet.retweets_count,
            };
            *counter = if engaged {
                *counter + 1
            } else {
                counter.saturating_sub(1)
            };
            tweet.updated_at = Utc::now();
        }
        let tweet = tweet.clone();
        debug!(?relation, user = %user_id, tweet = %tweet_id, engaged, changed, "Engagement stored");

        Ok(Engagement {
            tweet: self.with_author(&tweet)?,
            changed,
        })
    }
}

/// Keeps users, tweets, relationships and notifications in memory behind one lock.
#[derive(Default)]
pub struct InMemorySocialStore {
    state: RwLock<MemoryState>,
}

impl InMemorySocialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SocialStore for InMemorySocialStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut state = self.state.write();
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("username {} is taken", user.username)));
        }
        state.users.insert(user.id.clone(), user.clone());
        debug!(user = %user.id, username = %user.username, "User stored");
        Ok(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().users.get(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_tweet(&self, tweet: Tweet) -> Result<TweetWithAuthor, StoreError> {
        self.state.write().insert_tweet(tweet)
    }

    async fn get_tweet(&self, id: &TweetId) -> Result<Option<TweetWithAuthor>, StoreError> {
        let state = self.state.read();
        state
            .tweets
            .get(id)
            .map(|tweet| state.with_author(tweet))
            .transpose()
    }

    async fn like_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError> {
        self.state
            .write()
            .set_engagement(Relation::Like, user_id, tweet_id, true)
    }

    async fn retweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError> {
        self.state
            .write()
            .set_engagement(Relation::Retweet, user_id, tweet_id, true)
    }

    async fn unlike_tweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError> {
        self.state
            .write()
            .set_engagement(Relation::Like, user_id, tweet_id, false)
    }

    async fn unretweet(&self, user_id: &UserId, tweet_id: &TweetId) -> Result<Engagement, StoreError> {
        self.state
            .write()
            .set_engagement(Relation::Retweet, user_id, tweet_id, false)
    }

    async fn quote_tweet(&self, original: &TweetId, tweet: Tweet) -> Result<Quote, StoreError> {
        let mut state = self.state.write();
        if !state.tweets.contains_key(original) {
            return Err(tweet_not_found(original));
        }

        let quote = state.insert_tweet(tweet.quoting(original.clone()))?;
        let quoted = state
            .tweets
            .get_mut(original)
            .ok_or_else(|| tweet_not_found(original))?;
        quoted.retweets_count += 1;
        quoted.updated_at = Utc::now();
        let quoted = quoted.clone();

        Ok(Quote {
            quote,
            original: state.with_author(&quoted)?,
        })
    }

    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        state.user(follower)?;
        state.user(followee)?;

        let created = state.follows.insert((follower.clone(), followee.clone()));
        if created {
            if let Some(user) = state.users.get_mut(follower) {
                user.following_count += 1;
            }
            if let Some(user) = state.users.get_mut(followee) {
                user.followers_count += 1;
            }
        }
        Ok(created)
    }

    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        state.user(follower)?;
        state.user(followee)?;

        let removed = state.follows.remove(&(follower.clone(), followee.clone()));
        if removed {
            if let Some(user) = state.users.get_mut(follower) {
                user.following_count = user.following_count.saturating_sub(1);
            }
            if let Some(user) = state.users.get_mut(followee) {
                user.followers_count = user.followers_count.saturating_sub(1);
            }
        }
        Ok(removed)
    }

    async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        self.state.write().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .state
            .read()
            .notifications
            .iter()
            .rev()
            .filter(|n| &n.target_user_id == user_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        notification_id: &str,
        user_id: &UserId,
    ) -> Result<Notification, StoreError> {
        let mut state = self.state.write();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && &n.target_user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("notification {}", notification_id)))?;
        notification.is_read = true;
        Ok(notification.clone())
    }
}
