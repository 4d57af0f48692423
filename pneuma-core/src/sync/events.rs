//! Change-driven state sending.
//!
//! [`StateChangeEventSender`] sends a state only when it differs from the
//! last value sent (or has never been sent since the last reset). It keeps
//! a snapshot of every sent state; on each call it re-scans the schedule
//! for changes, then emits at most one changed state, round-robin. A
//! [`reset`](StateChangeEventSender::reset) marks everything unsent again,
//! which is how a newly connected peer receives the full picture.

use crate::sync::states::{FilteredStateSender, IndexedStateSender, SequentialStateSender};
use crate::util::containers::{EnumMap, EnumSet, Ordinal};

/// Emits schedule states when they change, one per call.
#[derive(Debug)]
pub struct StateChangeEventSender<I: Ordinal, S, const N: usize, const CAP: usize> {
    sequence: SequentialStateSender<I, N>,
    schedule: [I; N],
    sendable: EnumSet<I, CAP>,
    sent: EnumMap<I, S, CAP>,
}

impl<I, S, const N: usize, const CAP: usize> StateChangeEventSender<I, S, N, CAP>
where
    I: Ordinal,
    S: Clone + PartialEq,
{
    pub fn new(schedule: [I; N]) -> Self {
        let mut sender = Self {
            sequence: SequentialStateSender::new(schedule, true),
            schedule,
            sendable: EnumSet::new(),
            sent: EnumMap::new(),
        };
        sender.reset();
        sender
    }

    /// Forget all sent snapshots so every scheduled state is resent.
    pub fn reset(&mut self) {
        self.sent.clear();
        for &index in self.schedule.iter() {
            self.sendable.insert(index);
        }
    }

    /// Emit the next changed (or never-sent) state, if any.
    pub fn output(&mut self, states: &impl IndexedStateSender<I, S>) -> Option<(I, S)> {
        for &index in self.schedule.iter() {
            if let Some(current) = states.output(index) {
                let changed = match self.sent.get(index) {
                    Some(sent) => *sent != current,
                    None => true,
                };
                if changed {
                    self.sendable.insert(index);
                }
            }
        }

        let filtered = FilteredStateSender::new(states, &self.sendable);
        let (index, state) = self.sequence.output(&filtered)?;
        let _ = self.sent.insert(index, state.clone());
        self.sendable.remove(index);
        Some((index, state))
    }
}
