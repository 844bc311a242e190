/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - models                                               |
/// |   - services                                             |
/// +----------------------------------------------------------+

/// Domain payloads: users, tweets, notifications, feed events.
pub mod models;

/// Registry, brokers and the write path.
pub mod services;
