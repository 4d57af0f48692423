//! Schedule-driven state senders.
//!
//! A sender walks a fixed cyclic schedule of state indices and asks an
//! [`IndexedStateSender`] for the state at each. The schedule expresses
//! send-rate weighting by repetition: listing an index twice sends it
//! twice per lap.

use crate::util::containers::{EnumSet, Ordinal};

/// Random access to sendable states by index.
pub trait IndexedStateSender<I, S> {
    /// The current state at `index`, or `None` if it has nothing to send.
    fn output(&self, index: I) -> Option<S>;
}

/// Walks a cyclic schedule, emitting one state per call.
///
/// With `skip_unavailable` the sender scans at most one full lap past
/// indices with nothing to send; without it, an unavailable index yields
/// `None` for that call and the cursor still advances.
#[derive(Debug)]
pub struct SequentialStateSender<I, const N: usize> {
    schedule: [I; N],
    cursor: usize,
    skip_unavailable: bool,
}

impl<I: Copy, const N: usize> SequentialStateSender<I, N> {
    pub const fn new(schedule: [I; N], skip_unavailable: bool) -> Self {
        Self {
            schedule,
            cursor: 0,
            skip_unavailable,
        }
    }

    pub fn output<S>(&mut self, states: &impl IndexedStateSender<I, S>) -> Option<(I, S)> {
        if N == 0 {
            return None;
        }
        for _ in 0..N {
            let index = self.schedule[self.cursor];
            self.cursor = (self.cursor + 1) % N;
            if let Some(state) = states.output(index) {
                return Some((index, state));
            }
            if !self.skip_unavailable {
                return None;
            }
        }
        None
    }
}

/// Restricts an [`IndexedStateSender`] to an allow-set of indices.
#[derive(Debug)]
pub struct FilteredStateSender<'a, T, I: Ordinal, const CAP: usize> {
    inner: &'a T,
    allowed: &'a EnumSet<I, CAP>,
}

impl<'a, T, I: Ordinal, const CAP: usize> FilteredStateSender<'a, T, I, CAP> {
    pub fn new(inner: &'a T, allowed: &'a EnumSet<I, CAP>) -> Self {
        Self { inner, allowed }
    }
}

impl<'a, T, I, S, const CAP: usize> IndexedStateSender<I, S>
    for FilteredStateSender<'a, T, I, CAP>
where
    T: IndexedStateSender<I, S>,
    I: Ordinal,
{
    fn output(&self, index: I) -> Option<S> {
        if self.allowed.contains(index) {
            self.inner.output(index)
        } else {
            None
        }
    }
}
