//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module bridges a registry subscription to a long-lived `text/event-stream` response.
// One task per connection waits on either the client going away or the next event, and writes
// each event as its own `data: <json>\n\n` body chunk.
//--------------------------------------------------------------------------------------------------
// STRUCTS, ENUMS & FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                        | Key Methods        |
// |-----------------|----------------------------------------------------|--------------------|
// | EventSink       | Chunked outbound body of one connection            | write_frame,       |
// |                 |                                                    | cancelled          |
// | StreamEnd       | Why a streaming task stopped                       | -                  |
// | sse_frame       | Serializes one event into an SSE frame             | -                  |
// | forward_events  | Streaming loop: subscription -> sink               | -                  |
// | event_stream    | Builds the streaming response for a subscription   | -                  |
//--------------------------------------------------------------------------------------------------

use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{debug, warn};

use crate::domain::services::registry::{Subscription, TopicKey};

/// Content type of every streaming endpoint.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Outbound side of one streaming connection.
///
/// Every frame written becomes a separate body chunk, which the transport writes out as soon as
/// it is produced. The sink reports cancellation once the response body has been dropped, which
/// is what happens when the client disconnects.
#[derive(Debug, Clone)]
pub struct EventSink {
    frames: mpsc::Sender<Bytes>,
}

/// The client is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;

impl EventSink {
    /// Creates a sink and the body stream feeding the response.
    pub fn channel() -> (Self, ReceiverStream<Bytes>) {
        let (frames, body) = mpsc::channel(1);
        (Self { frames }, ReceiverStream::new(body))
    }

    pub async fn write_frame(&self, frame: Bytes) -> Result<(), Disconnected> {
        self.frames.send(frame).await.map_err(|_| Disconnected)
    }

    /// Resolves once the connection is gone.
    pub async fn cancelled(&self) {
        self.frames.closed().await
    }
}

/// Reason a streaming task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The client disconnected.
    ClientDisconnected,
    /// The registry closed the channel (unsubscribe or shutdown).
    SubscriptionClosed,
}

/// Formats one event as `data: <json>\n\n`.
pub fn sse_frame<E: Serialize>(event: &E) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(event)?;
    let mut frame = Vec::with_capacity(json.len() + 8);
    frame.extend_from_slice(b"data: ");
    frame.extend_from_slice(&json);
    frame.extend_from_slice(b"\n\n");
    Ok(Bytes::from(frame))
}

/// Forwards events from `subscription` to `sink` until either side ends.
///
/// The subscription is dropped on return, which unsubscribes it.
pub async fn forward_events<K, E>(mut subscription: Subscription<K, E>, sink: EventSink) -> StreamEnd
where
    K: TopicKey,
    E: Serialize,
{
    let key = subscription.key().clone();
    let end = loop {
        tokio::select! {
            biased;

            _ = sink.cancelled() => break StreamEnd::ClientDisconnected,

            next = subscription.recv() => {
                let Some(event) = next else {
                    break StreamEnd::SubscriptionClosed;
                };
                let frame = match sse_frame(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(?key, "Skipping event that failed to serialize: {}", e);
                        continue;
                    }
                };
                if sink.write_frame(frame).await.is_err() {
                    break StreamEnd::ClientDisconnected;
                }
            }
        }
    };
    debug!(?key, subscription = %subscription.id(), ?end, "Event stream finished");
    end
}

/// Spawns the streaming task for `subscription` and returns the response it feeds.
pub fn event_stream<K, E>(subscription: Subscription<K, E>) -> Response
where
    K: TopicKey,
    E: Serialize + Send + 'static,
{
    let (sink, frames) = EventSink::channel();
    tokio::spawn(forward_events(subscription, sink));

    let body = Body::from_stream(frames.map(Ok::<_, Infallible>));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::ser::Error as _;
    use serde::Serializer;
    use tokio::time::timeout;

    use super::*;
    use crate::domain::services::registry::EventRegistry;

    #[derive(Clone)]
    enum Payload {
        Ok(u32),
        Broken,
    }

    impl Serialize for Payload {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Payload::Ok(n) => serializer.serialize_u32(*n),
                Payload::Broken => Err(S::Error::custom("broken payload")),
            }
        }
    }

    #[test]
    fn test_sse_frame_format() {
        let frame = sse_frame(&serde_json::json!({"type": "like"})).unwrap();
        assert_eq!(&frame[..], b"data: {\"type\":\"like\"}\n\n");
    }

    #[tokio::test]
    async fn test_forwards_events_and_skips_broken_ones() {
        let registry: EventRegistry<&'static str, Payload> = EventRegistry::new("test", 8);
        let subscription = registry.subscribe("u1");
        let (sink, mut frames) = EventSink::channel();
        let task = tokio::spawn(forward_events(subscription, sink));

        registry.publish(&"u1", Payload::Ok(1));
        registry.publish(&"u1", Payload::Broken);
        registry.publish(&"u1", Payload::Ok(2));

        let first = timeout(Duration::from_secs(1), frames.next()).await.unwrap();
        let second = timeout(Duration::from_secs(1), frames.next()).await.unwrap();
        assert_eq!(first.as_deref(), Some(&b"data: 1\n\n"[..]));
        assert_eq!(second.as_deref(), Some(&b"data: 2\n\n"[..]));

        registry.close();
        let end = timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert_eq!(end, StreamEnd::SubscriptionClosed);
        assert_eq!(frames.next().await, None);
    }

    #[tokio::test]
    async fn test_client_disconnect_releases_subscription() {
        let registry: EventRegistry<&'static str, Payload> = EventRegistry::new("test", 8);
        let subscription = registry.subscribe("u1");
        let (sink, frames) = EventSink::channel();
        let task = tokio::spawn(forward_events(subscription, sink));
        assert_eq!(registry.subscriber_count(), 1);

        drop(frames);

        let end = timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert_eq!(end, StreamEnd::ClientDisconnected);
        assert_eq!(registry.subscriber_count(), 0);
        assert!(!registry.contains_topic(&"u1"));
    }

    #[tokio::test]
    async fn test_event_stream_headers() {
        let registry: EventRegistry<&'static str, Payload> = EventRegistry::new("test", 8);
        let response = event_stream(registry.subscribe("u1"));

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], EVENT_STREAM_CONTENT_TYPE);
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
    }
}
