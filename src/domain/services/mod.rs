//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// | Module        | Description                                                        |
// |---------------|--------------------------------------------------------------------|
// | registry      | Generic topic-keyed channel registry                               |
// | notifications | Notification broker keyed by (type, user)                          |
// | feed          | Feed broker keyed by user, addressed and broadcast delivery        |
// | activity      | Write path: persist, then publish                                  |
//--------------------------------------------------------------------------------------------------

pub mod registry;
pub mod notifications;
pub mod feed;
pub mod activity;
