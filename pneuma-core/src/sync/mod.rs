//! State and list synchronization over a lossy, unacknowledged link.
//!
//! Everything here assumes messages may be dropped and simply keeps
//! resending current state: the backend converges on the controller's
//! state (and vice versa for request segments) without retransmission
//! logic in the transport.

pub mod events;
pub mod lists;
pub mod states;
pub mod synchronizers;
