// ABOUTME: Configuration of the emulated modem session
// ABOUTME: Originating address, slot count, virtual message texts and the clock used for listings

use crate::codec;
use crate::datatypes::{PhoneNumber, ScTimestamp};
use crate::session::error::{SessionError, SessionResult};
use chrono::{DateTime, FixedOffset};

/// Number of message slots the modem reports
pub const DEFAULT_SLOTS: u8 = 16;

/// Originating number of every virtual message
pub const DEFAULT_SENDER: &str = "+46701111111";

/// Source of listing timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Host local time and UTC offset
    #[default]
    System,
    /// Always the given instant
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    pub fn timestamp(&self) -> ScTimestamp {
        match self {
            Clock::System => ScTimestamp::now(),
            Clock::Fixed(datetime) => ScTimestamp::from_datetime(datetime),
        }
    }
}

/// Configuration for a modem session
///
/// The defaults are the texts a CTC heat pump controller reacts to:
/// `aktiveranummer` registers the number, `rum<N>` sets the room target and
/// `driftdata` asks for a status report.
///
/// # Example
///
/// ```rust
/// use ctc_heatpump::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_sender("+46709999999".parse().unwrap())
///     .with_telemetry_text("status");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address reported as the sender of the virtual message
    pub sender: PhoneNumber,

    /// Total slots reported by `+CPMS`; deletes outside `1..=slots` fail
    pub slots: u8,

    /// Text of the virtual message until the pump has been activated
    pub activation_text: String,

    /// Prefix of the temperature request, followed by the requested value
    pub temperature_prefix: String,

    /// Text of the virtual message asking for telemetry
    pub telemetry_text: String,

    /// Clock stamped on listings
    pub clock: Clock,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sender: PhoneNumber::new(DEFAULT_SENDER).expect("default sender is a valid number"),
            slots: DEFAULT_SLOTS,
            activation_text: "aktiveranummer".to_string(),
            temperature_prefix: "rum".to_string(),
            telemetry_text: "driftdata".to_string(),
            clock: Clock::System,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(mut self, sender: PhoneNumber) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_slots(mut self, slots: u8) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_activation_text(mut self, text: impl Into<String>) -> Self {
        self.activation_text = text.into();
        self
    }

    pub fn with_temperature_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temperature_prefix = prefix.into();
        self
    }

    pub fn with_telemetry_text(mut self, text: impl Into<String>) -> Self {
        self.telemetry_text = text.into();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Check that the configuration can be put on the wire unchanged
    pub fn validate(&self) -> SessionResult<()> {
        if self.slots == 0 {
            return Err(SessionError::InvalidConfig(
                "at least one message slot is required".to_string(),
            ));
        }

        let texts = [
            ("activation_text", &self.activation_text),
            ("temperature_prefix", &self.temperature_prefix),
            ("telemetry_text", &self.telemetry_text),
        ];
        for (field, text) in texts {
            if text.contains(['\r', '\n']) {
                return Err(SessionError::InvalidConfig(format!(
                    "{field} must be a single line"
                )));
            }
            if !codec::is_encodable(text) {
                return Err(SessionError::InvalidConfig(format!(
                    "{field} {text:?} has characters outside the GSM alphabet"
                )));
            }
        }

        Ok(())
    }
}
