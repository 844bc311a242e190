/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - stream                                               |
/// |   - feed_handler                                         |
/// |   - notifications_handler                                |
/// |   - tweet_handler                                        |
/// |   - user_handler                                         |
/// |   - inbox_handler                                        |
/// |   - health_handler                                       |
/// +----------------------------------------------------------+

/// Subscription-to-response bridge shared by the streaming endpoints
pub mod stream;

/// Handler for the activity feed stream
pub mod feed_handler;

/// Handler for the notification streams
pub mod notifications_handler;

/// Handlers for tweet writes
pub mod tweet_handler;

/// Handlers for user registration and follows
pub mod user_handler;

/// Stored notifications
pub mod inbox_handler;

/// Health check
pub mod health_handler;
