//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the notification broker: a typed facade over the event registry where
// every topic is one (notification type, recipient) pair.
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name               | Description                                   | Key Methods           |
// |--------------------|-----------------------------------------------|-----------------------|
// | NotificationKey    | Topic key: notification type + user           | new                   |
// | NotificationBroker | Routes each notification to its recipient     | subscribe, publish    |
//--------------------------------------------------------------------------------------------------

use tracing::debug;

use crate::domain::models::{Notification, NotificationType, UserId};

use super::registry::{EventRegistry, PublishReport, Subscription, SubscriptionId};

/// Topic key of a notification stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub kind: NotificationType,
    pub user_id: UserId,
}

impl NotificationKey {
    pub fn new(kind: NotificationType, user_id: UserId) -> Self {
        Self { kind, user_id }
    }
}

/// A live notification stream for one user and one notification type.
pub type NotificationSubscription = Subscription<NotificationKey, Notification>;

/// Delivers notifications to the stream of their recipient.
#[derive(Debug, Clone)]
pub struct NotificationBroker {
    registry: EventRegistry<NotificationKey, Notification>,
}

impl NotificationBroker {
    /// Creates a broker whose subscriber channels buffer `capacity` notifications.
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: EventRegistry::new("notifications", capacity),
        }
    }

    pub fn subscribe(&self, kind: NotificationType, user_id: UserId) -> NotificationSubscription {
        self.registry.subscribe(NotificationKey::new(kind, user_id))
    }

    /// Removes one stream. Unknown streams are ignored.
    pub fn unsubscribe(&self, kind: NotificationType, user_id: UserId, id: SubscriptionId) -> bool {
        self.registry
            .unsubscribe(&NotificationKey::new(kind, user_id), id)
    }

    /// Delivers `notification` to the streams keyed by its type and target user.
    ///
    /// Never blocks and never fails: a recipient that is not connected, or whose buffer is
    /// full, misses the notification.
    pub fn publish(&self, notification: &Notification) -> PublishReport {
        let key = NotificationKey::new(notification.kind, notification.target_user_id.clone());
        let report = self.registry.publish(&key, notification.clone());
        debug!(
            notification = %notification.id,
            kind = %notification.kind,
            target = %notification.target_user_id,
            delivered = report.delivered,
            "Notification published"
        );
        report
    }

    /// Ends every open stream and refuses new ones.
    pub fn close(&self) {
        self.registry.close();
    }

    pub fn registry(&self) -> &EventRegistry<NotificationKey, Notification> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn like_for(target: &str) -> Notification {
        Notification::new(
            UserId::new(target),
            UserId::new("actor"),
            None,
            NotificationType::Like,
        )
    }

    #[tokio::test]
    async fn test_publish_addresses_one_recipient() {
        let broker = NotificationBroker::new(8);
        let mut u1 = broker.subscribe(NotificationType::Like, UserId::new("u1"));

        let first = like_for("u1");
        assert_eq!(broker.publish(&first).delivered, 1);
        assert_eq!(u1.recv().await, Some(first));

        let second = like_for("u2");
        assert_eq!(broker.publish(&second).delivered, 0);
        assert_eq!(u1.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_publish_respects_notification_type() {
        let broker = NotificationBroker::new(8);
        let mut follows = broker.subscribe(NotificationType::Follow, UserId::new("u1"));

        broker.publish(&like_for("u1"));

        assert_eq!(follows.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_same_stream_twice_is_independent() {
        let broker = NotificationBroker::new(8);
        let user = UserId::new("u1");
        let first = broker.subscribe(NotificationType::Follow, user.clone());
        let mut second = broker.subscribe(NotificationType::Follow, user.clone());
        let key = NotificationKey::new(NotificationType::Follow, user.clone());

        assert!(broker.unsubscribe(NotificationType::Follow, user.clone(), first.id()));
        assert!(broker.registry().contains_topic(&key));

        let follow = Notification::new(user.clone(), UserId::new("u9"), None, NotificationType::Follow);
        broker.publish(&follow);
        assert_eq!(second.try_recv(), Ok(follow));

        drop(second);
        assert!(!broker.registry().contains_topic(&key));
        assert!(!broker.unsubscribe(NotificationType::Follow, user, first.id()));
    }

    #[tokio::test]
    async fn test_close_ends_streams() {
        let broker = NotificationBroker::new(8);
        let mut stream = broker.subscribe(NotificationType::Mention, UserId::new("u1"));

        broker.close();

        assert_eq!(stream.recv().await, None);
        let mut late = broker.subscribe(NotificationType::Mention, UserId::new("u1"));
        assert_eq!(late.recv().await, None);
    }
}
