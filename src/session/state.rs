// ABOUTME: State machine behind the single virtual SMS slot
// ABOUTME: Tracks activation, the pending temperature request and whether the pump has read the slot

use crate::session::config::SessionConfig;
use std::fmt;

/// Progress of the exchange with the heat pump's outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutstandingRequest {
    /// The pump has not sent anything yet
    #[default]
    NoneYet,
    /// The pump is transmitting a message.
    ///
    /// Only held while `at+cmgs` reads the message body. Commands are
    /// handled one at a time, so no other handler runs in this state; the
    /// listing suppression it drives is reachable only through the state
    /// API.
    Pending,
    /// The pump has sent at least one message
    Acknowledged,
}

/// The message currently sitting in slot 1, derived from the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualMessage {
    /// Registers this number with the controller
    ActivationPrompt,
    /// Asks the controller to change its room target
    TemperatureChange(u32),
    /// Asks the controller for a status report
    Telemetry,
}

impl VirtualMessage {
    /// Message text as configured for this session
    pub fn text(&self, config: &SessionConfig) -> String {
        match self {
            VirtualMessage::ActivationPrompt => config.activation_text.clone(),
            VirtualMessage::TemperatureChange(value) => {
                format!("{}{}", config.temperature_prefix, value)
            }
            VirtualMessage::Telemetry => config.telemetry_text.clone(),
        }
    }
}

/// What deleting slot 1 acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The slot had not been listed since the last delete; nothing changed
    NotRead,
    /// The activation prompt was consumed
    Activated,
    /// The temperature request with this value was consumed
    TemperatureAcknowledged(u32),
    /// The telemetry request was consumed
    Telemetry,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::NotRead => write!(f, "unread slot, ignored"),
            DeleteOutcome::Activated => write!(f, "activated"),
            DeleteOutcome::TemperatureAcknowledged(value) => {
                write!(f, "temperature {value} acknowledged")
            }
            DeleteOutcome::Telemetry => write!(f, "telemetry request acknowledged"),
        }
    }
}

/// Mutable state of one modem session.
///
/// Only command handlers change it, one command at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    outstanding_request: OutstandingRequest,
    read_text: bool,
    activated: bool,
    temperature_change_request: Option<u32>,
    last_message: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding_request(&self) -> OutstandingRequest {
        self.outstanding_request
    }

    /// True once the current virtual message has been listed and not yet deleted
    pub fn read_text(&self) -> bool {
        self.read_text
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn temperature_change_request(&self) -> Option<u32> {
        self.temperature_change_request
    }

    /// Text of the most recent message received from the pump
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Slots reported as occupied by `+CPMS`
    pub fn used_slots(&self) -> u8 {
        match self.outstanding_request {
            OutstandingRequest::NoneYet => 1,
            OutstandingRequest::Pending | OutstandingRequest::Acknowledged => 0,
        }
    }

    /// Whether a listing should show the virtual message
    pub fn has_unread(&self) -> bool {
        self.outstanding_request != OutstandingRequest::Pending
    }

    /// Message in slot 1: activation first, then a pending temperature
    /// request, otherwise a telemetry request
    pub fn current_message(&self) -> VirtualMessage {
        if !self.activated {
            VirtualMessage::ActivationPrompt
        } else if let Some(value) = self.temperature_change_request {
            VirtualMessage::TemperatureChange(value)
        } else {
            VirtualMessage::Telemetry
        }
    }

    /// Record a new room target, replacing any unacknowledged one
    pub fn request_temperature(&mut self, value: u32) {
        self.temperature_change_request = Some(value);
    }

    /// The pump listed the virtual message
    pub fn mark_read(&mut self) {
        self.read_text = true;
    }

    /// The pump deleted slot 1. Only a listed message counts as consumed.
    pub fn delete_first_slot(&mut self) -> DeleteOutcome {
        let outcome = if !self.read_text {
            DeleteOutcome::NotRead
        } else if !self.activated {
            self.activated = true;
            DeleteOutcome::Activated
        } else if let Some(value) = self.temperature_change_request.take() {
            DeleteOutcome::TemperatureAcknowledged(value)
        } else {
            DeleteOutcome::Telemetry
        };

        self.read_text = false;
        outcome
    }

    /// The pump started sending a message
    pub fn begin_request(&mut self) {
        self.outstanding_request = OutstandingRequest::Pending;
    }

    /// The pump finished sending; `message` is its decoded text, if any
    pub fn finish_request(&mut self, message: Option<String>) {
        self.outstanding_request = OutstandingRequest::Acknowledged;
        if message.is_some() {
            self.last_message = message;
        }
    }
}
