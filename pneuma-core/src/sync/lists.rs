//! Event-list synchronization.
//!
//! [`ListSender`] keeps a bounded ring of list elements with monotonically
//! increasing ids and repeatedly offers the peer a segment of everything
//! at or past its acknowledged cursor. The peer acknowledges with the next
//! id it expects plus the session id it has been following; a session
//! mismatch means the acknowledgement belongs to a previous life of this
//! sender and must not move the cursor.

use heapless::Deque;

/// A list element with a stable id.
pub trait ListElement {
    fn id(&self) -> u32;
}

/// Non-fatal acknowledgement anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListAckError {
    /// The acknowledgement names a different session; ignored.
    StaleSession,
    /// The acknowledged cursor points before the oldest buffered element;
    /// delivery restarts from the oldest element still held.
    StaleNextExpected,
}

/// One outbound segment of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSegment<E, const SEG: usize> {
    pub next_expected: u32,
    pub total: u32,
    pub remaining: u32,
    pub session_id: u32,
    pub elements: heapless::Vec<E, SEG>,
}

/// Sends a bounded, id-ordered list to a peer that acknowledges by cursor.
#[derive(Debug)]
pub struct ListSender<E, const CAP: usize, const SEG: usize> {
    elements: Deque<E, CAP>,
    next_expected: u32,
    total: u32,
    session_id: u32,
}

impl<E, const CAP: usize, const SEG: usize> Default for ListSender<E, CAP, SEG> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, const CAP: usize, const SEG: usize> ListSender<E, CAP, SEG> {
    pub const fn new() -> Self {
        Self {
            elements: Deque::new(),
            next_expected: 0,
            total: 0,
            session_id: 0,
        }
    }

    /// Start a session. Buffered elements and the peer cursor are dropped;
    /// the lifetime total is kept.
    pub fn setup(&mut self, session_id: u32) {
        self.session_id = session_id;
        self.elements.clear();
        self.next_expected = 0;
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }
}

impl<E: ListElement + Clone, const CAP: usize, const SEG: usize> ListSender<E, CAP, SEG> {
    /// Append an element. When the ring is full the oldest element is
    /// overwritten and returned, acknowledged or not.
    pub fn input(&mut self, element: E) -> Option<E> {
        let overwritten = if self.elements.is_full() {
            self.elements.pop_front()
        } else {
            None
        };
        // Cannot fail: a slot was just freed if the ring was full
        let _ = self.elements.push_back(element);
        self.total = self.total.saturating_add(1);
        overwritten
    }

    /// Apply a peer acknowledgement.
    ///
    /// A stale cursor still restarts delivery from the oldest held
    /// element; a stale session changes nothing.
    pub fn ack(&mut self, next_expected: u32, session_id: u32) -> Result<(), ListAckError> {
        if session_id != self.session_id {
            return Err(ListAckError::StaleSession);
        }
        self.next_expected = next_expected;
        if let Some(oldest) = self.elements.front() {
            if next_expected < oldest.id() {
                return Err(ListAckError::StaleNextExpected);
            }
        }
        Ok(())
    }

    /// The segment to offer the peer right now: up to `SEG` elements at or
    /// past the acknowledged cursor, oldest first.
    pub fn output(&self) -> ListSegment<E, SEG> {
        let mut segment = ListSegment {
            next_expected: self.next_expected,
            total: self.total,
            remaining: 0,
            session_id: self.session_id,
            elements: heapless::Vec::new(),
        };
        for element in self.elements.iter() {
            if element.id() < self.next_expected {
                continue;
            }
            segment.remaining += 1;
            if segment.elements.len() < SEG {
                // Capacity checked on the line above
                let _ = segment.elements.push(element.clone());
            }
        }
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: u32,
    }

    impl ListElement for Entry {
        fn id(&self) -> u32 {
            self.id
        }
    }

    type Sender = ListSender<Entry, 4, 2>;

    fn sender_with(ids: &[u32]) -> Sender {
        let mut sender = Sender::new();
        sender.setup(77);
        for &id in ids {
            assert_eq!(sender.input(Entry { id }), None);
        }
        sender
    }

    #[test]
    fn test_segment_offers_unacknowledged_oldest_first() {
        let sender = sender_with(&[0, 1, 2]);
        let segment = sender.output();
        assert_eq!(segment.next_expected, 0);
        assert_eq!(segment.total, 3);
        assert_eq!(segment.remaining, 3);
        assert_eq!(segment.session_id, 77);
        assert_eq!(&segment.elements[..], &[Entry { id: 0 }, Entry { id: 1 }]);
    }

    #[test]
    fn test_ack_advances_cursor() {
        let mut sender = sender_with(&[0, 1, 2]);
        sender.ack(2, 77).unwrap();
        let segment = sender.output();
        assert_eq!(segment.next_expected, 2);
        assert_eq!(segment.remaining, 1);
        assert_eq!(&segment.elements[..], &[Entry { id: 2 }]);
    }

    #[test]
    fn test_fully_acknowledged_list_sends_empty_segments() {
        let mut sender = sender_with(&[0, 1]);
        sender.ack(2, 77).unwrap();
        let segment = sender.output();
        assert_eq!(segment.remaining, 0);
        assert!(segment.elements.is_empty());
        // The header still carries the session for the peer to follow
        assert_eq!(segment.session_id, 77);
    }

    #[test]
    fn test_stale_session_ack_ignored() {
        let mut sender = sender_with(&[0, 1]);
        assert_eq!(sender.ack(2, 76), Err(ListAckError::StaleSession));
        assert_eq!(sender.output().next_expected, 0);
    }

    #[test]
    fn test_overwrite_returns_oldest_and_restarts_delivery() {
        let mut sender = sender_with(&[0, 1, 2, 3]);
        sender.ack(1, 77).unwrap();

        // Ring is full: the next input drops id 0
        assert_eq!(sender.input(Entry { id: 4 }), Some(Entry { id: 0 }));
        let segment = sender.output();
        assert_eq!(segment.remaining, 4);
        assert_eq!(&segment.elements[..], &[Entry { id: 1 }, Entry { id: 2 }]);
    }

    #[test]
    fn test_overwritten_unacknowledged_cursor_goes_stale() {
        let mut sender = sender_with(&[0, 1, 2, 3]);
        let _ = sender.input(Entry { id: 4 }); // drops id 0, oldest now 1

        // Peer still asks for id 0: stale, delivery restarts from id 1
        assert_eq!(sender.ack(0, 77), Err(ListAckError::StaleNextExpected));
        let segment = sender.output();
        assert_eq!(&segment.elements[..], &[Entry { id: 1 }, Entry { id: 2 }]);
        assert_eq!(segment.remaining, 4);
    }

    proptest! {
        /// For any fill level and ack cursor, the offered segment covers
        /// exactly the unacknowledged elements still held, oldest first.
        #[test]
        fn test_segment_consistency(n in 1u32..40, ack in 0u32..40) {
            let mut sender: ListSender<Entry, 4, 2> = ListSender::new();
            sender.setup(1);
            for id in 0..n {
                let _ = sender.input(Entry { id });
            }
            let cursor = ack.min(n);
            let _ = sender.ack(cursor, 1);

            let segment = sender.output();
            let oldest_held = n.saturating_sub(4);
            let first_offered = cursor.max(oldest_held);

            prop_assert_eq!(segment.total, n);
            prop_assert_eq!(segment.remaining, n - first_offered);
            prop_assert_eq!(
                segment.elements.len(),
                (segment.remaining as usize).min(2)
            );
            for (i, element) in segment.elements.iter().enumerate() {
                prop_assert_eq!(element.id, first_offered + i as u32);
            }
        }
    }

    #[test]
    fn test_setup_drops_buffer_but_keeps_total() {
        let mut sender = sender_with(&[0, 1, 2]);
        sender.setup(78);
        let segment = sender.output();
        assert_eq!(segment.session_id, 78);
        assert_eq!(segment.total, 3);
        assert_eq!(segment.remaining, 0);
        assert!(segment.elements.is_empty());
    }
}
