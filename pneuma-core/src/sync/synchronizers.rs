//! Backend synchronization root.
//!
//! [`Synchronizers`] owns the send schedules and the event-log sender and
//! decides, every send interval, which single state segment goes to the
//! backend next. Three schedules rotate: a realtime lane for streaming
//! sensor data, a change-driven lane for low-latency updates, and a slow
//! cyclic lane that resends everything for eventual consistency on a lossy
//! link. Inbound segments are filtered to the request types the backend is
//! allowed to write.

use crate::application::messages::{
    LogEvent, MessageType, NextLogEvents, StateSegment, LOG_EVENTS_SEGMENT_MAX,
};
use crate::application::store::Store;
use crate::sync::events::StateChangeEventSender;
use crate::sync::lists::{ListAckError, ListSegment, ListSender};
use crate::sync::states::SequentialStateSender;
use crate::util::containers::{EnumSet, Ordinal};
use crate::util::timer::MsTimer;

/// Interval between outbound sends.
pub const SEND_INTERVAL_MS: u32 = 10;

/// Silence on the inbound side longer than this means disconnected.
pub const CONNECTION_TIMEOUT_MS: u32 = 500;

/// Log events buffered for the backend before the oldest is overwritten.
pub const LOG_EVENTS_BUFFER_CAP: usize = 32;

const REALTIME_SCHEDULE: [MessageType; 1] = [MessageType::SensorMeasurements];

const MAIN_SCHEDULE: [MessageType; 6] = [
    MessageType::CycleMeasurements,
    MessageType::Parameters,
    MessageType::AlarmLimits,
    MessageType::NextLogEvents,
    MessageType::ActiveLogEvents,
    MessageType::AlarmMute,
];

#[derive(Debug, Clone, Copy)]
enum RootEntry {
    Realtime,
    Event,
    Main,
}

const ROOT_SCHEDULE: [RootEntry; 3] = [RootEntry::Realtime, RootEntry::Event, RootEntry::Main];

/// Accepted inbound segment, and how it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncInput {
    Applied,
    /// A log acknowledgement that was stale; state is unchanged or
    /// delivery restarted, see [`ListAckError`].
    StaleAck(ListAckError),
}

/// Rejected inbound segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncInputError {
    /// The backend may not write this segment type.
    UnwritableType,
}

type EventSender = StateChangeEventSender<MessageType, StateSegment, 6, { MessageType::COUNT }>;
type LogSender = ListSender<LogEvent, LOG_EVENTS_BUFFER_CAP, LOG_EVENTS_SEGMENT_MAX>;

/// Drives state and log synchronization with the backend.
#[derive(Debug)]
pub struct Synchronizers {
    realtime: SequentialStateSender<MessageType, 1>,
    event: EventSender,
    main: SequentialStateSender<MessageType, 6>,
    root_cursor: usize,
    log_sender: LogSender,
    receivable: EnumSet<MessageType, { MessageType::COUNT }>,
    send_timer: MsTimer,
    current_time: u32,
    last_receive: Option<u32>,
    was_connected: bool,
}

impl Synchronizers {
    /// `session_id` distinguishes this process's event log from any
    /// previous one the backend may still hold a cursor into.
    pub fn new(session_id: u32) -> Self {
        let mut log_sender = LogSender::new();
        log_sender.setup(session_id);

        let mut receivable = EnumSet::new();
        receivable.insert(MessageType::ParametersRequest);
        receivable.insert(MessageType::AlarmLimitsRequest);
        receivable.insert(MessageType::ExpectedLogEvent);
        receivable.insert(MessageType::AlarmMuteRequest);

        Self {
            realtime: SequentialStateSender::new(REALTIME_SCHEDULE, true),
            event: EventSender::new(MAIN_SCHEDULE),
            main: SequentialStateSender::new(MAIN_SCHEDULE, true),
            root_cursor: 0,
            log_sender,
            receivable,
            send_timer: MsTimer::new(SEND_INTERVAL_MS),
            current_time: 0,
            last_receive: None,
            was_connected: false,
        }
    }

    /// Advance the millisecond clock and track connection transitions.
    ///
    /// A reconnect resets the change-driven lane so the backend receives
    /// the full state picture again.
    pub fn update_clock(&mut self, now: u32) {
        self.current_time = now;
        let connected = self.connected();
        if connected && !self.was_connected {
            self.event.reset();
        }
        self.was_connected = connected;
    }

    /// Whether anything was received within the connection timeout.
    pub fn connected(&self) -> bool {
        match self.last_receive {
            Some(at) => self.current_time.wrapping_sub(at) < CONNECTION_TIMEOUT_MS,
            None => false,
        }
    }

    /// Apply one inbound segment from the backend.
    pub fn input(
        &mut self,
        store: &mut Store,
        segment: &StateSegment,
    ) -> Result<SyncInput, SyncInputError> {
        if !self.receivable.contains(segment.message_type()) {
            return Err(SyncInputError::UnwritableType);
        }
        self.last_receive = Some(self.current_time);
        store.input(segment);

        if let StateSegment::ExpectedLogEvent(ack) = segment {
            if let Err(stale) = self.log_sender.ack(ack.id, ack.session_id) {
                return Ok(SyncInput::StaleAck(stale));
            }
        }
        Ok(SyncInput::Applied)
    }

    /// Append a locally produced log event. Returns the oldest event if
    /// the buffer overwrote it undelivered.
    pub fn input_log_event(&mut self, store: &mut Store, event: LogEvent) -> Option<LogEvent> {
        let overwritten = self.log_sender.input(event);
        store.input(&StateSegment::NextLogEvents(self.log_segment()));
        overwritten
    }

    /// The next segment to send, if the send interval has elapsed and any
    /// lane has something to offer.
    pub fn output(&mut self, store: &mut Store) -> Option<StateSegment> {
        if !self.send_timer.expired(self.current_time) {
            return None;
        }
        self.send_timer.reset(self.current_time);
        store.input(&StateSegment::NextLogEvents(self.log_segment()));

        for _ in 0..ROOT_SCHEDULE.len() {
            let entry = ROOT_SCHEDULE[self.root_cursor];
            self.root_cursor = (self.root_cursor + 1) % ROOT_SCHEDULE.len();
            let emitted = match entry {
                RootEntry::Realtime => self.realtime.output(store).map(|(_, s)| s),
                RootEntry::Event => self.event.output(store).map(|(_, s)| s),
                RootEntry::Main => self.main.output(store).map(|(_, s)| s),
            };
            if emitted.is_some() {
                return emitted;
            }
        }
        None
    }

    fn log_segment(&self) -> NextLogEvents {
        let segment: ListSegment<LogEvent, LOG_EVENTS_SEGMENT_MAX> = self.log_sender.output();
        NextLogEvents {
            next_expected: segment.next_expected,
            total: segment.total,
            remaining: segment.remaining,
            session_id: segment.session_id,
            elements: segment.elements,
        }
    }
}
