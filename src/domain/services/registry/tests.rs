use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::timeout;

use super::{EventRegistry, PublishReport};

type Key = (&'static str, &'static str);

fn registry(capacity: usize) -> EventRegistry<Key, u32> {
    EventRegistry::new("test", capacity)
}

#[test]
fn test_last_unsubscribe_removes_topic() {
    let registry = registry(4);
    let key = ("like", "u1");

    let first = registry.subscribe(key);
    let second = registry.subscribe(key);
    assert_eq!(registry.subscribers_for(&key), 2);

    assert!(registry.unsubscribe(&key, first.id()));
    assert!(registry.contains_topic(&key));

    assert!(registry.unsubscribe(&key, second.id()));
    assert!(!registry.contains_topic(&key));
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_dropping_subscription_unsubscribes() {
    let registry = registry(4);
    let key = ("follow", "u1");

    {
        let _subscription = registry.subscribe(key);
        assert_eq!(registry.subscriber_count(), 1);
    }

    assert_eq!(registry.subscriber_count(), 0);
    assert!(!registry.contains_topic(&key));
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let registry = registry(4);
    let key = ("like", "u1");
    let other_key = ("like", "u2");

    let subscription = registry.subscribe(key);
    let mut other = registry.subscribe(other_key);

    assert!(registry.unsubscribe(&key, subscription.id()));
    assert!(!registry.unsubscribe(&key, subscription.id()));
    assert!(!registry.unsubscribe(&("mention", "nobody"), subscription.id()));
    drop(subscription);

    assert_eq!(registry.subscribers_for(&other_key), 1);
    registry.publish(&other_key, 9);
    assert_eq!(other.try_recv(), Ok(9));
}

#[tokio::test]
async fn test_unsubscribe_closes_channel() {
    let registry = registry(4);
    let key = ("like", "u1");
    let mut subscription = registry.subscribe(key);

    registry.unsubscribe(&key, subscription.id());

    let next = timeout(Duration::from_secs(1), subscription.recv()).await.unwrap();
    assert_eq!(next, None);
}

#[test]
fn test_publish_is_isolated_per_key() {
    let registry = registry(4);
    let mut u1 = registry.subscribe(("like", "u1"));
    let mut u2 = registry.subscribe(("like", "u2"));
    let mut u1_follow = registry.subscribe(("follow", "u1"));

    let report = registry.publish(&("like", "u1"), 1);

    assert_eq!(report.delivered, 1);
    assert_eq!(u1.try_recv(), Ok(1));
    assert_eq!(u2.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(u1_follow.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn test_publish_without_subscribers_is_noop() {
    let registry = registry(4);
    let report = registry.publish(&("like", "u1"), 1);

    assert_eq!(report, PublishReport::default());
    assert_eq!(registry.topic_count(), 0);
}

#[tokio::test]
async fn test_full_buffer_drops_without_blocking() {
    let registry = registry(2);
    let key = ("retweet", "u1");
    let mut subscription = registry.subscribe(key);

    registry.publish(&key, 1);
    registry.publish(&key, 2);

    let report = timeout(Duration::from_millis(100), async { registry.publish(&key, 3) })
        .await
        .expect("publish must not block on a full buffer");
    assert_eq!(report.dropped, 1);
    assert_eq!(report.delivered, 0);

    assert_eq!(subscription.recv().await, Some(1));
    assert_eq!(subscription.recv().await, Some(2));
    assert_eq!(subscription.try_recv(), Err(TryRecvError::Empty));

    // Space freed up, so later events get through again.
    registry.publish(&key, 4);
    assert_eq!(subscription.recv().await, Some(4));
    assert_eq!(registry.subscribers_for(&key), 1);
}

#[tokio::test]
async fn test_order_is_preserved_for_one_subscriber() {
    let registry = registry(16);
    let key = ("reply", "u1");
    let mut subscription = registry.subscribe(key);

    for n in 0..16 {
        registry.publish(&key, n);
    }

    let mut received = Vec::new();
    for _ in 0..16 {
        received.push(subscription.recv().await.unwrap());
    }
    assert_eq!(received, (0..16).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_close_ends_existing_and_new_subscriptions() {
    let registry = registry(4);
    let key = ("like", "u1");
    let mut existing = registry.subscribe(key);
    registry.publish(&key, 1);

    registry.close();

    assert!(registry.is_closed());
    assert_eq!(registry.topic_count(), 0);
    assert_eq!(existing.recv().await, None);

    let mut late = registry.subscribe(key);
    assert_eq!(late.recv().await, None);
    assert_eq!(late.try_recv(), Err(TryRecvError::Disconnected));
    assert_eq!(registry.subscriber_count(), 0);

    let report = registry.publish(&key, 2);
    assert_eq!(report, PublishReport::default());
    assert_eq!(registry.publish_to_all(3), PublishReport::default());

    // Second close is harmless.
    registry.close();
}

#[tokio::test]
async fn test_close_wakes_pending_receiver() {
    let registry = registry(4);
    let mut subscription = registry.subscribe(("like", "u1"));

    let waiter = tokio::spawn(async move { subscription.recv().await });
    tokio::task::yield_now().await;
    registry.close();

    let result = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_duplicate_key_subscriptions_are_independent() {
    let registry = registry(4);
    let key = ("follow", "u1");
    let mut first = registry.subscribe(key);
    let mut second = registry.subscribe(key);
    assert_ne!(first.id(), second.id());

    registry.publish(&key, 1);
    assert_eq!(first.try_recv(), Ok(1));
    assert_eq!(second.try_recv(), Ok(1));

    registry.unsubscribe(&key, first.id());
    assert_eq!(first.try_recv(), Err(TryRecvError::Disconnected));

    registry.publish(&key, 2);
    assert_eq!(second.try_recv(), Ok(2));
    assert!(registry.contains_topic(&key));

    registry.unsubscribe(&key, second.id());
    assert!(!registry.contains_topic(&key));
}

#[test]
fn test_publish_to_all_reaches_every_topic() {
    let registry = registry(4);
    let mut a = registry.subscribe(("feed", "u1"));
    let mut b = registry.subscribe(("feed", "u2"));
    let mut c = registry.subscribe(("feed", "u2"));

    let report = registry.publish_to_all(5);

    assert_eq!(report.delivered, 3);
    assert_eq!(a.try_recv(), Ok(5));
    assert_eq!(b.try_recv(), Ok(5));
    assert_eq!(c.try_recv(), Ok(5));
}

#[test]
fn test_closed_receiver_is_pruned_on_publish() {
    let registry = registry(4);
    let key = ("like", "u1");
    let mut healthy = registry.subscribe(key);
    let mut stale = registry.subscribe(key);
    stale.receiver.close();

    let report = registry.publish(&key, 1);

    assert_eq!(report.delivered, 1);
    assert_eq!(report.pruned, 1);
    assert_eq!(registry.subscribers_for(&key), 1);
    assert_eq!(healthy.try_recv(), Ok(1));

    drop(stale);
    assert_eq!(registry.subscribers_for(&key), 1);
}

#[test]
fn test_concurrent_subscribe_publish_unsubscribe() {
    let registry = registry(8);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let registry = registry.clone();
            scope.spawn(move || {
                let users = ["u1", "u2", "u3", "u4"];
                for round in 0..200 {
                    let key = ("like", users[(worker + round) % users.len()]);
                    let subscription = registry.subscribe(key);
                    registry.publish(&key, round as u32);
                    registry.publish_to_all(round as u32);
                    if round % 2 == 0 {
                        registry.unsubscribe(&key, subscription.id());
                    }
                }
            });
        }
    });

    assert_eq!(registry.subscriber_count(), 0);
    assert_eq!(registry.topic_count(), 0);
}
