//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the in-memory publish/subscribe primitive shared by the notification and
// feed brokers. Delivery is best-effort and at-most-once: a publish never waits on a subscriber.
//
// | Component                | Description                                                |
// |--------------------------|-----------------------------------------------------------|
// | EventRegistry            | Topic-keyed map of bounded subscriber channels            |
// | Subscription             | Receiving half handed to one subscriber                   |
// | PublishReport            | Delivered / dropped / pruned counters of one publish      |
//--------------------------------------------------------------------------------------------------

mod event_registry;

#[cfg(test)]
mod tests;

// Re-exports
pub use event_registry::{EventRegistry, PublishReport, Subscription, SubscriptionId, TopicKey};
