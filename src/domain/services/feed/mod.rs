//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the feed broker: a typed facade over the event registry keyed by user
// id alone, carrying tweet-lifecycle events.
//--------------------------------------------------------------------------------------------------
// STRUCTS & ENUMS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                      | Key Methods              |
// |---------------|--------------------------------------------------|--------------------------|
// | FeedDelivery  | Who receives a tweet-lifecycle event             | from_str                 |
// | FeedBroker    | Addressed and broadcast delivery of feed events  | publish, publish_to_all, |
// |               |                                                  | dispatch                 |
//--------------------------------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::models::{FeedEvent, UserId};

use super::registry::{EventRegistry, PublishReport, Subscription, SubscriptionId};

/// Routing policy applied by [`FeedBroker::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedDelivery {
    /// Every connected user sees every tweet-lifecycle event.
    #[default]
    Broadcast,
    /// Only the author of the affected tweet sees the event.
    Author,
}

impl FromStr for FeedDelivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "broadcast" | "all" => Ok(Self::Broadcast),
            "author" => Ok(Self::Author),
            other => Err(format!("invalid feed delivery policy: {}", other)),
        }
    }
}

impl fmt::Display for FeedDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str("broadcast"),
            Self::Author => f.write_str("author"),
        }
    }
}

/// A live feed stream for one user.
pub type FeedSubscription = Subscription<UserId, FeedEvent>;

/// Delivers feed events to connected users.
#[derive(Debug, Clone)]
pub struct FeedBroker {
    registry: EventRegistry<UserId, FeedEvent>,
    delivery: FeedDelivery,
}

impl FeedBroker {
    pub fn new(capacity: usize, delivery: FeedDelivery) -> Self {
        Self {
            registry: EventRegistry::new("feed", capacity),
            delivery,
        }
    }

    pub fn delivery(&self) -> FeedDelivery {
        self.delivery
    }

    pub fn subscribe(&self, user_id: UserId) -> FeedSubscription {
        self.registry.subscribe(user_id)
    }

    pub fn unsubscribe(&self, user_id: &UserId, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(user_id, id)
    }

    /// Delivers `event` to the streams of `user_id` only.
    pub fn publish(&self, user_id: &UserId, event: FeedEvent) -> PublishReport {
        self.registry.publish(user_id, event)
    }

    /// Delivers `event` to every connected user.
    pub fn publish_to_all(&self, event: FeedEvent) -> PublishReport {
        self.registry.publish_to_all(event)
    }

    /// Routes `event` according to the configured [`FeedDelivery`] policy.
    pub fn dispatch(&self, event: FeedEvent) -> PublishReport {
        let kind = event.kind;
        let report = match self.delivery {
            FeedDelivery::Broadcast => self.publish_to_all(event),
            FeedDelivery::Author => {
                let author = event.tweet_author().clone();
                self.publish(&author, event)
            }
        };
        debug!(
            ?kind,
            delivery = %self.delivery,
            delivered = report.delivered,
            "Feed event dispatched"
        );
        report
    }

    pub fn close(&self) {
        self.registry.close();
    }

    pub fn registry(&self) -> &EventRegistry<UserId, FeedEvent> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FeedEventType, Tweet, TweetWithAuthor, User};
    use tokio::sync::mpsc::error::TryRecvError;

    fn event_by(author: &User, actor: &str, kind: FeedEventType) -> FeedEvent {
        let tweet = Tweet::new(author.id.clone(), "hello", None);
        FeedEvent::new(kind, TweetWithAuthor::new(tweet, author), UserId::new(actor))
    }

    #[tokio::test]
    async fn test_publish_to_all_reaches_unrelated_users() {
        let broker = FeedBroker::new(8, FeedDelivery::Broadcast);
        let mut u1 = broker.subscribe(UserId::new("u1"));
        let author = User::new("alice", None);

        let event = event_by(&author, "u2", FeedEventType::Created);
        broker.publish_to_all(event.clone());

        assert_eq!(u1.recv().await, Some(event));
    }

    #[test]
    fn test_publish_addresses_single_user() {
        let broker = FeedBroker::new(8, FeedDelivery::Broadcast);
        let mut u1 = broker.subscribe(UserId::new("u1"));
        let mut u2 = broker.subscribe(UserId::new("u2"));
        let author = User::new("alice", None);

        broker.publish(&UserId::new("u2"), event_by(&author, "u3", FeedEventType::Liked));

        assert_eq!(u1.try_recv(), Err(TryRecvError::Empty));
        assert!(u2.try_recv().is_ok());
    }

    #[test]
    fn test_dispatch_follows_policy() {
        let author = User::new("alice", None);

        let broadcast = FeedBroker::new(8, FeedDelivery::Broadcast);
        let mut watcher = broadcast.subscribe(UserId::new("watcher"));
        broadcast.dispatch(event_by(&author, "bob", FeedEventType::Retweeted));
        assert!(watcher.try_recv().is_ok());

        let addressed = FeedBroker::new(8, FeedDelivery::Author);
        let mut watcher = addressed.subscribe(UserId::new("watcher"));
        let mut owner = addressed.subscribe(author.id.clone());
        addressed.dispatch(event_by(&author, "bob", FeedEventType::Retweeted));
        assert_eq!(watcher.try_recv(), Err(TryRecvError::Empty));
        assert!(owner.try_recv().is_ok());
    }

    #[test]
    fn test_feed_delivery_from_str() {
        assert_eq!("broadcast".parse::<FeedDelivery>(), Ok(FeedDelivery::Broadcast));
        assert_eq!(" Author ".parse::<FeedDelivery>(), Ok(FeedDelivery::Author));
        assert!("everyone".parse::<FeedDelivery>().is_err());
    }

    #[tokio::test]
    async fn test_close_then_publish_is_noop() {
        let broker = FeedBroker::new(8, FeedDelivery::Broadcast);
        let mut stream = broker.subscribe(UserId::new("u1"));
        broker.close();

        let author = User::new("alice", None);
        let report = broker.publish_to_all(event_by(&author, "u2", FeedEventType::Created));

        assert_eq!(report.delivered, 0);
        assert_eq!(stream.recv().await, None);
    }
}
