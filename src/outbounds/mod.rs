/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - store                                                |
/// +----------------------------------------------------------+

/// Persistence port and the in-memory adapter.
pub mod store;
