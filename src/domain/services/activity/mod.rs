//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module contains the write path: each operation persists a mutation through the store
// port and then emits the matching notification and feed events. Publishing is a side channel;
// it can never fail or slow down the operation that triggered it.
//--------------------------------------------------------------------------------------------------

pub mod activity_service;


use thiserror::Error;

use crate::outbounds::store::StoreError;

pub use activity_service::ActivityService;

/// Maximum tweet length, in characters.
pub const MAX_TWEET_LENGTH: usize = 280;

/// Largest page returned when listing notifications.
pub const MAX_NOTIFICATION_PAGE: usize = 100;

/// Errors that can occur in the activity service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// Tweet content is empty or too long
    #[error("Invalid tweet content: {0}")]
    InvalidContent(String),

    /// Username is empty or malformed
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// A user tried to follow or unfollow themselves
    #[error("Users cannot follow themselves")]
    SelfFollow,

    /// Error from the persistence layer
    #[error(transparent)]
    Store(#[from] StoreError),
}
