//! Board-agnostic application logic for the Pneuma ventilator controller.
//!
//! Everything above the wire protocol lives here: the application state
//! types and their postcard codecs, the state store, the state- and
//! list-synchronization senders, and the [`sync::synchronizers`]
//! composition that drives the backend link. Nothing in this crate touches
//! hardware; the firmware crate wires it to a UART and a millisecond clock.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

pub mod application;
pub mod sync;
pub mod util;

pub use application::codec::message_descriptors;
pub use application::messages::{MessageType, StateSegment};
pub use application::store::Store;
pub use sync::synchronizers::Synchronizers;
