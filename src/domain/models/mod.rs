/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - types                                                |
/// |   - notification                                         |
/// |   - feed_event                                           |
/// +----------------------------------------------------------+

/// Identifiers, users and tweets.
pub mod types;

/// Notification payloads and their categories.
pub mod notification;

/// Feed event payloads.
pub mod feed_event;

pub use feed_event::{FeedEvent, FeedEventType};
pub use notification::{Notification, NotificationType, UnknownNotificationType};
pub use types::{Tweet, TweetAuthor, TweetId, TweetWithAuthor, User, UserId};
