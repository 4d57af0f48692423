//! Small statically-allocated building blocks shared across the crate.

pub mod containers;
pub mod timer;
