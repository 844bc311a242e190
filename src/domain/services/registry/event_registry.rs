//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the topic-scoped channel registry that every broker is built on.
// Each topic key maps to one or more bounded channels, one per live subscriber.
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                   | Key Methods                   |
// |---------------|-----------------------------------------------|-------------------------------|
// | EventRegistry | Owns every subscriber channel, keyed by topic | subscribe, unsubscribe,       |
// |               |                                               | publish, publish_to_all, close|
// | Subscription  | Receive-only handle held by one subscriber    | recv, try_recv                |
// | PublishReport | Outcome counters of a single publish call     | -                             |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, info};
use uuid::Uuid;

/// Identifies one subscriber channel within a topic.
pub type SubscriptionId = Uuid;

/// Bounds required of a topic key.
pub trait TopicKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> TopicKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Counters describing what happened to one published event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Channels that accepted the event.
    pub delivered: usize,
    /// Channels whose buffer was full; the event was dropped for them.
    pub dropped: usize,
    /// Channels found closed and removed from the registry.
    pub pruned: usize,
}

struct Slot<E> {
    id: SubscriptionId,
    sender: mpsc::Sender<E>,
}

struct RegistryInner<K, E> {
    topics: HashMap<K, Vec<Slot<E>>>,
}

impl<K: TopicKey, E> RegistryInner<K, E> {
    /// Drops the sender of one channel, closing it. Removes the topic when it becomes empty.
    fn remove_slot(&mut self, key: &K, id: SubscriptionId) -> bool {
        let Some(slots) = self.topics.get_mut(key) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        let removed = slots.len() < before;
        if slots.is_empty() {
            self.topics.remove(key);
        }
        removed
    }
}

/// Per-topic, per-subscriber channel registry.
///
/// The registry is the only owner of the sending half of every channel it creates, so it is the
/// only component that can close one. Publishing never blocks: a subscriber whose buffer is full
/// simply misses the event.
///
/// Clones share the same underlying state.
///
/// # Examples
///
/// ```
/// use tweet_fanout::domain::services::registry::EventRegistry;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let registry: EventRegistry<String, u32> = EventRegistry::new("example", 8);
/// let mut subscription = registry.subscribe("topic".to_string());
///
/// registry.publish(&"topic".to_string(), 7);
/// assert_eq!(subscription.recv().await, Some(7));
///
/// registry.close();
/// assert_eq!(subscription.recv().await, None);
/// # }
/// ```
pub struct EventRegistry<K, E> {
    inner: Arc<RwLock<RegistryInner<K, E>>>,
    closed: Arc<AtomicBool>,
    capacity: usize,
    name: &'static str,
}

impl<K, E> Clone for EventRegistry<K, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            closed: Arc::clone(&self.closed),
            capacity: self.capacity,
            name: self.name,
        }
    }
}

impl<K, E> fmt::Debug for EventRegistry<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl<K: TopicKey, E: Clone + Send + 'static> EventRegistry<K, E> {
    /// Creates an empty registry whose channels buffer up to `capacity` events each.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in log output.
    /// * `capacity` - Per-subscriber buffer size. Zero is raised to one.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                topics: HashMap::new(),
            })),
            closed: Arc::new(AtomicBool::new(false)),
            capacity: capacity.max(1),
            name,
        }
    }

    /// Registers a new channel under `key` and returns its receiving handle.
    ///
    /// Once the registry is closed the returned subscription is already at end-of-stream.
    pub fn subscribe(&self, key: K) -> Subscription<K, E> {
        let mut inner = self.inner.write();

        if self.is_closed() {
            debug!(registry = self.name, ?key, "Subscribe on closed registry");
            return Subscription::closed(key, self.clone());
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = Uuid::new_v4();
        let slots = inner.topics.entry(key.clone()).or_default();
        slots.push(Slot { id, sender });

        debug!(
            registry = self.name,
            ?key,
            subscription = %id,
            channels = slots.len(),
            "Subscribed"
        );

        Subscription {
            id,
            key,
            receiver,
            registry: self.clone(),
        }
    }

    /// Removes and closes one channel. Unknown keys or ids are ignored.
    ///
    /// # Returns
    ///
    /// `true` if a channel was removed by this call.
    pub fn unsubscribe(&self, key: &K, id: SubscriptionId) -> bool {
        let removed = self.inner.write().remove_slot(key, id);
        if removed {
            debug!(registry = self.name, ?key, subscription = %id, "Unsubscribed");
        }
        removed
    }

    /// Offers `event` to every channel registered under `key` without waiting.
    pub fn publish(&self, key: &K, event: E) -> PublishReport {
        let mut report = PublishReport::default();
        let mut dead = Vec::new();

        {
            let inner = self.inner.read();
            let Some(slots) = inner.topics.get(key) else {
                return report;
            };
            for slot in slots {
                if !self.offer(slot, event.clone(), &mut report) {
                    dead.push((key.clone(), slot.id));
                }
            }
        }

        report.pruned = self.prune(dead);
        self.log_report(Some(key), &report);
        report
    }

    /// Offers `event` to every channel in the registry without waiting.
    pub fn publish_to_all(&self, event: E) -> PublishReport {
        let mut report = PublishReport::default();
        let mut dead = Vec::new();

        {
            let inner = self.inner.read();
            for (key, slots) in inner.topics.iter() {
                for slot in slots {
                    if !self.offer(slot, event.clone(), &mut report) {
                        dead.push((key.clone(), slot.id));
                    }
                }
            }
        }

        report.pruned = self.prune(dead);
        self.log_report(None, &report);
        report
    }

    /// Closes every channel and rejects further subscriptions. Calling it again is a no-op.
    pub fn close(&self) {
        let mut inner = self.inner.write();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let channels: usize = inner.topics.values().map(Vec::len).sum();
        inner.topics.clear();
        info!(registry = self.name, channels, "Event registry closed");
    }

    /// Tries a single non-blocking send. Returns `false` when the channel is closed.
    fn offer(&self, slot: &Slot<E>, event: E, report: &mut PublishReport) -> bool {
        match slot.sender.try_send(event) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                report.dropped += 1;
                debug!(registry = self.name, subscription = %slot.id, "Subscriber buffer full, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Removes channels found closed during a publish. Runs after the read lock is released.
    fn prune(&self, dead: Vec<(K, SubscriptionId)>) -> usize {
        if dead.is_empty() {
            return 0;
        }
        let mut inner = self.inner.write();
        let mut pruned = 0;
        for (key, id) in dead {
            if inner.remove_slot(&key, id) {
                pruned += 1;
            }
        }
        pruned
    }

    fn log_report(&self, key: Option<&K>, report: &PublishReport) {
        if report.dropped > 0 || report.pruned > 0 {
            debug!(
                registry = self.name,
                ?key,
                delivered = report.delivered,
                dropped = report.dropped,
                pruned = report.pruned,
                "Published with losses"
            );
        }
    }
}

impl<K: TopicKey, E> EventRegistry<K, E> {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Per-subscriber buffer size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of topic keys with at least one channel.
    pub fn topic_count(&self) -> usize {
        self.inner.read().topics.len()
    }

    /// Total number of live channels across all topics.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().topics.values().map(Vec::len).sum()
    }

    /// Number of live channels under `key`.
    pub fn subscribers_for(&self, key: &K) -> usize {
        self.inner.read().topics.get(key).map_or(0, Vec::len)
    }

    pub fn contains_topic(&self, key: &K) -> bool {
        self.inner.read().topics.contains_key(key)
    }

    fn release(&self, key: &K, id: SubscriptionId) {
        self.inner.write().remove_slot(key, id);
    }
}

/// Receive-only view of one registry channel.
///
/// Dropping the handle unsubscribes it, so every exit path of its owner releases the channel.
pub struct Subscription<K: TopicKey, E> {
    id: SubscriptionId,
    key: K,
    pub(super) receiver: mpsc::Receiver<E>,
    registry: EventRegistry<K, E>,
}

impl<K: TopicKey, E> Subscription<K, E> {
    fn closed(key: K, registry: EventRegistry<K, E>) -> Self {
        let (_, receiver) = mpsc::channel(1);
        Self {
            id: Uuid::new_v4(),
            key,
            receiver,
            registry,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Waits for the next event. `None` means the channel was closed by the registry.
    ///
    /// Events still buffered when the registry is closed are discarded.
    pub async fn recv(&mut self) -> Option<E> {
        if self.registry.is_closed() {
            return None;
        }
        let event = self.receiver.recv().await;
        if self.registry.is_closed() {
            return None;
        }
        event
    }

    /// Takes the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Result<E, TryRecvError> {
        if self.registry.is_closed() {
            return Err(TryRecvError::Disconnected);
        }
        self.receiver.try_recv()
    }
}

impl<K: TopicKey, E> fmt::Debug for Subscription<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish()
    }
}

impl<K: TopicKey, E> Drop for Subscription<K, E> {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.id);
    }
}
