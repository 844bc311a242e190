//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                       | Key Methods          |
// |-----------------|---------------------------------------------------|----------------------|
// | ActivityService | Persists user actions and fans out their events   | create_tweet,        |
// |                 |                                                   | quote_tweet,         |
// |                 |                                                   | like_tweet, retweet, |
// |                 |                                                   | follow_user,         |
// |                 |                                                   | list_notifications   |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::models::{
    FeedEvent, FeedEventType, Notification, NotificationType, Tweet, TweetId, TweetWithAuthor,
    User, UserId,
};
use crate::domain::services::feed::FeedBroker;
use crate::domain::services::notifications::NotificationBroker;
use crate::outbounds::store::SocialStore;

use super::{ActivityError, MAX_NOTIFICATION_PAGE, MAX_TWEET_LENGTH};

/// Persists user actions and publishes the resulting events.
///
/// Notifications are never sent to the user who caused them.
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn SocialStore>,
    notifications: NotificationBroker,
    feed: FeedBroker,
}

impl ActivityService {
    pub fn new(
        store: Arc<dyn SocialStore>,
        notifications: NotificationBroker,
        feed: FeedBroker,
    ) -> Self {
        Self {
            store,
            notifications,
            feed,
        }
    }

    /// Registers a new user.
    pub async fn register_user(
        &self,
        username: &str,
        display_name: Option<String>,
    ) -> Result<User, ActivityError> {
        let username = username.trim();
        if username.is_empty() || !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ActivityError::InvalidUsername(username.to_string()));
        }
        let user = self.store.create_user(User::new(username, display_name)).await?;
        info!(user = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Stores a tweet by `actor`.
    ///
    /// Emits a `created` feed event, a `reply` notification to the parent's author when
    /// `reply_to` is set, and a `mention` notification for every `@username` naming a known user.
    pub async fn create_tweet(
        &self,
        actor: &UserId,
        content: &str,
        reply_to: Option<TweetId>,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let content = validate_content(content)?;
        let tweet = self
            .store
            .create_tweet(Tweet::new(actor.clone(), content, reply_to.clone()))
            .await?;
        info!(tweet = %tweet.tweet.id, author = %actor, "Tweet created");

        self.feed.dispatch(FeedEvent::new(
            FeedEventType::Created,
            tweet.clone(),
            actor.clone(),
        ));

        if let Some(parent_id) = &reply_to {
            self.notify_reply(actor, parent_id, &tweet.tweet.id).await;
        }
        self.notify_mentions(actor, &tweet.tweet).await;

        Ok(tweet)
    }

    /// Stores a tweet by `actor` quoting `original`.
    ///
    /// The quote is a new tweet, so it gets the `created` feed event and mention notifications.
    /// For the quoted tweet it counts as a retweet: its author gets a `retweet` notification and
    /// a `retweeted` feed event is dispatched.
    pub async fn quote_tweet(
        &self,
        actor: &UserId,
        original: &TweetId,
        content: &str,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let content = validate_content(content)?;
        let quote = self
            .store
            .quote_tweet(original, Tweet::new(actor.clone(), content, None))
            .await?;
        info!(tweet = %quote.quote.tweet.id, quoted = %original, author = %actor, "Tweet quoted");

        self.feed.dispatch(FeedEvent::new(
            FeedEventType::Created,
            quote.quote.clone(),
            actor.clone(),
        ));
        self.notify_mentions(actor, &quote.quote.tweet).await;
        self.emit_engagement(
            actor,
            &quote.original,
            NotificationType::Retweet,
            FeedEventType::Retweeted,
        )
        .await;

        Ok(quote.quote)
    }

    /// Records a like. A repeated like changes nothing and emits nothing.
    pub async fn like_tweet(
        &self,
        actor: &UserId,
        tweet_id: &TweetId,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let engagement = self.store.like_tweet(actor, tweet_id).await?;
        if engagement.changed {
            info!(tweet = %tweet_id, user = %actor, "Tweet liked");
            self.emit_engagement(
                actor,
                &engagement.tweet,
                NotificationType::Like,
                FeedEventType::Liked,
            )
            .await;
        }
        Ok(engagement.tweet)
    }

    /// Records a retweet. A repeated retweet changes nothing and emits nothing.
    pub async fn retweet(
        &self,
        actor: &UserId,
        tweet_id: &TweetId,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let engagement = self.store.retweet(actor, tweet_id).await?;
        if engagement.changed {
            info!(tweet = %tweet_id, user = %actor, "Tweet retweeted");
            self.emit_engagement(
                actor,
                &engagement.tweet,
                NotificationType::Retweet,
                FeedEventType::Retweeted,
            )
            .await;
        }
        Ok(engagement.tweet)
    }

    /// Removes a like. Emits nothing.
    pub async fn unlike_tweet(
        &self,
        actor: &UserId,
        tweet_id: &TweetId,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let engagement = self.store.unlike_tweet(actor, tweet_id).await?;
        if engagement.changed {
            info!(tweet = %tweet_id, user = %actor, "Tweet unliked");
        }
        Ok(engagement.tweet)
    }

    /// Removes a retweet. Emits nothing.
    pub async fn unretweet(
        &self,
        actor: &UserId,
        tweet_id: &TweetId,
    ) -> Result<TweetWithAuthor, ActivityError> {
        let engagement = self.store.unretweet(actor, tweet_id).await?;
        if engagement.changed {
            info!(tweet = %tweet_id, user = %actor, "Retweet removed");
        }
        Ok(engagement.tweet)
    }

    /// Makes `actor` follow `target` and notifies `target`.
    pub async fn follow_user(&self, actor: &UserId, target: &UserId) -> Result<(), ActivityError> {
        if actor == target {
            return Err(ActivityError::SelfFollow);
        }
        if self.store.follow(actor, target).await? {
            info!(follower = %actor, followee = %target, "User followed");
            self.notify(Notification::new(
                target.clone(),
                actor.clone(),
                None,
                NotificationType::Follow,
            ))
            .await;
        }
        Ok(())
    }

    /// Makes `actor` stop following `target`. Emits nothing.
    pub async fn unfollow_user(&self, actor: &UserId, target: &UserId) -> Result<(), ActivityError> {
        if actor == target {
            return Err(ActivityError::SelfFollow);
        }
        if self.store.unfollow(actor, target).await? {
            info!(follower = %actor, followee = %target, "User unfollowed");
        }
        Ok(())
    }

    /// `user_id`'s stored notifications, newest first. `limit` is capped at
    /// [`MAX_NOTIFICATION_PAGE`].
    pub async fn list_notifications(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>, ActivityError> {
        let limit = limit.min(MAX_NOTIFICATION_PAGE);
        Ok(self.store.list_notifications(user_id, limit, offset).await?)
    }

    pub async fn mark_notification_read(
        &self,
        user_id: &UserId,
        notification_id: &str,
    ) -> Result<Notification, ActivityError> {
        let notification = self
            .store
            .mark_notification_read(notification_id, user_id)
            .await?;
        debug!(notification = %notification_id, user = %user_id, "Notification read");
        Ok(notification)
    }

    async fn emit_engagement(
        &self,
        actor: &UserId,
        tweet: &TweetWithAuthor,
        notification: NotificationType,
        feed_event: FeedEventType,
    ) {
        let author = &tweet.author.id;
        if author != actor {
            self.notify(Notification::new(
                author.clone(),
                actor.clone(),
                Some(tweet.tweet.id.clone()),
                notification,
            ))
            .await;
        }
        self.feed
            .dispatch(FeedEvent::new(feed_event, tweet.clone(), actor.clone()));
    }

    /// Stores `notification` in the recipient's inbox, then publishes it.
    ///
    /// A storage failure is logged; the live stream still gets the notification.
    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.store.save_notification(&notification).await {
            warn!(notification = %notification.id, "Failed to store notification: {}", e);
        }
        self.notifications.publish(&notification);
    }

    async fn notify_reply(&self, actor: &UserId, parent_id: &TweetId, reply_id: &TweetId) {
        match self.store.get_tweet(parent_id).await {
            Ok(Some(parent)) if &parent.author.id != actor => {
                self.notify(Notification::new(
                    parent.author.id.clone(),
                    actor.clone(),
                    Some(reply_id.clone()),
                    NotificationType::Reply,
                ))
                .await;
            }
            Ok(_) => {}
            Err(e) => warn!(tweet = %parent_id, "Skipping reply notification: {}", e),
        }
    }

    async fn notify_mentions(&self, actor: &UserId, tweet: &Tweet) {
        for username in tweet.mentioned_usernames() {
            match self.store.find_user_by_username(&username).await {
                Ok(Some(user)) if &user.id != actor => {
                    self.notify(Notification::new(
                        user.id,
                        actor.clone(),
                        Some(tweet.id.clone()),
                        NotificationType::Mention,
                    ))
                    .await;
                }
                Ok(_) => {}
                Err(e) => warn!(username = %username, "Skipping mention notification: {}", e),
            }
        }
    }
}

fn validate_content(content: &str) -> Result<&str, ActivityError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ActivityError::InvalidContent("content is empty".to_string()));
    }
    if content.chars().count() > MAX_TWEET_LENGTH {
        return Err(ActivityError::InvalidContent(format!(
            "content exceeds {} characters",
            MAX_TWEET_LENGTH
        )));
    }
    Ok(content)
}
