//! The state store: current value of every exchangeable state segment.
//!
//! One field per [`MessageType`]. [`Store::input`] folds a received (or
//! locally produced) segment into the matching field; the
//! [`IndexedStateSender`] impl hands out a copy of any field for sending.
//! Which segments may be written from the wire is the synchronizer's
//! decision, not the store's.

use crate::application::messages::{
    ActiveLogEvents, AlarmLimits, AlarmLimitsRequest, AlarmMute, AlarmMuteRequest, Announcement,
    CycleMeasurements, ExpectedLogEvent, MessageType, NextLogEvents, Parameters,
    ParametersRequest, Ping, SensorMeasurements, StateSegment,
};
use crate::sync::states::IndexedStateSender;

/// Holds the latest value of each state segment.
#[derive(Debug, Clone, Default)]
pub struct Store {
    sensor_measurements: SensorMeasurements,
    cycle_measurements: CycleMeasurements,
    parameters: Parameters,
    parameters_request: ParametersRequest,
    alarm_limits: AlarmLimits,
    alarm_limits_request: AlarmLimitsRequest,
    expected_log_event: ExpectedLogEvent,
    next_log_events: NextLogEvents,
    active_log_events: ActiveLogEvents,
    alarm_mute: AlarmMute,
    alarm_mute_request: AlarmMuteRequest,
    ping: Ping,
    announcement: Announcement,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `segment` into the matching field.
    pub fn input(&mut self, segment: &StateSegment) {
        match segment {
            StateSegment::SensorMeasurements(v) => self.sensor_measurements = v.clone(),
            StateSegment::CycleMeasurements(v) => self.cycle_measurements = v.clone(),
            StateSegment::Parameters(v) => self.parameters = v.clone(),
            StateSegment::ParametersRequest(v) => self.parameters_request = v.clone(),
            StateSegment::AlarmLimits(v) => self.alarm_limits = v.clone(),
            StateSegment::AlarmLimitsRequest(v) => self.alarm_limits_request = v.clone(),
            StateSegment::ExpectedLogEvent(v) => self.expected_log_event = v.clone(),
            StateSegment::NextLogEvents(v) => self.next_log_events = v.clone(),
            StateSegment::ActiveLogEvents(v) => self.active_log_events = v.clone(),
            StateSegment::AlarmMute(v) => self.alarm_mute = v.clone(),
            StateSegment::AlarmMuteRequest(v) => self.alarm_mute_request = v.clone(),
            StateSegment::Ping(v) => self.ping = v.clone(),
            StateSegment::Announcement(v) => self.announcement = v.clone(),
        }
    }

    pub fn sensor_measurements(&self) -> &SensorMeasurements {
        &self.sensor_measurements
    }

    pub fn cycle_measurements(&self) -> &CycleMeasurements {
        &self.cycle_measurements
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Latest request from the backend; the control loop reconciles it
    /// against [`Self::parameters`].
    pub fn parameters_request(&self) -> &ParametersRequest {
        &self.parameters_request
    }

    pub fn alarm_limits(&self) -> &AlarmLimits {
        &self.alarm_limits
    }

    pub fn alarm_limits_request(&self) -> &AlarmLimitsRequest {
        &self.alarm_limits_request
    }

    pub fn expected_log_event(&self) -> &ExpectedLogEvent {
        &self.expected_log_event
    }

    pub fn next_log_events(&self) -> &NextLogEvents {
        &self.next_log_events
    }

    pub fn active_log_events(&self) -> &ActiveLogEvents {
        &self.active_log_events
    }

    pub fn alarm_mute(&self) -> &AlarmMute {
        &self.alarm_mute
    }

    pub fn alarm_mute_request(&self) -> &AlarmMuteRequest {
        &self.alarm_mute_request
    }
}

impl IndexedStateSender<MessageType, StateSegment> for Store {
    fn output(&self, index: MessageType) -> Option<StateSegment> {
        Some(match index {
            MessageType::SensorMeasurements => {
                StateSegment::SensorMeasurements(self.sensor_measurements.clone())
            }
            MessageType::CycleMeasurements => {
                StateSegment::CycleMeasurements(self.cycle_measurements.clone())
            }
            MessageType::Parameters => StateSegment::Parameters(self.parameters.clone()),
            MessageType::ParametersRequest => {
                StateSegment::ParametersRequest(self.parameters_request.clone())
            }
            MessageType::AlarmLimits => StateSegment::AlarmLimits(self.alarm_limits.clone()),
            MessageType::AlarmLimitsRequest => {
                StateSegment::AlarmLimitsRequest(self.alarm_limits_request.clone())
            }
            MessageType::ExpectedLogEvent => {
                StateSegment::ExpectedLogEvent(self.expected_log_event.clone())
            }
            MessageType::NextLogEvents => {
                StateSegment::NextLogEvents(self.next_log_events.clone())
            }
            MessageType::ActiveLogEvents => {
                StateSegment::ActiveLogEvents(self.active_log_events.clone())
            }
            MessageType::AlarmMute => StateSegment::AlarmMute(self.alarm_mute.clone()),
            MessageType::AlarmMuteRequest => {
                StateSegment::AlarmMuteRequest(self.alarm_mute_request.clone())
            }
            MessageType::Ping => StateSegment::Ping(self.ping.clone()),
            MessageType::Announcement => StateSegment::Announcement(self.announcement.clone()),
        })
    }
}
