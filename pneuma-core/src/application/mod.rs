//! Application state: the typed segments exchanged with the backend, their
//! wire codecs, and the store that holds the current value of each.

pub mod codec;
pub mod messages;
pub mod store;
