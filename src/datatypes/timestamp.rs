// ABOUTME: Service-centre timestamp reported in +CMGL listings
// ABOUTME: Formats and validates the YY/MM/DD,HH:MM:SS±QQ layout with quarter-hour UTC offsets

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a formatted timestamp, e.g. `24/07/12,12:30:45+08`
pub const TIMESTAMP_LEN: usize = 20;

const QUARTER_HOUR_SECS: i32 = 15 * 60;

/// Errors raised while parsing a service-centre timestamp
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("invalid timestamp length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid character {character:?} at position {position}, expected {expected}")]
    InvalidCharacter {
        position: usize,
        character: char,
        expected: &'static str,
    },

    #[error("{field} out of range: {value} (expected {min}-{max})")]
    InvalidRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Timestamp in the layout used by text-mode SMS listings.
///
/// The UTC offset is expressed in quarter hours, as the GSM network
/// reports it: local time minus UTC, truncated toward zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScTimestamp {
    year: u8,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    quarter_hours: i8,
}

impl ScTimestamp {
    /// Builds a timestamp from a date-time carrying its local offset
    pub fn from_datetime(datetime: &DateTime<FixedOffset>) -> Self {
        let offset_secs = datetime.offset().local_minus_utc();
        Self {
            year: (datetime.year().rem_euclid(100)) as u8,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second().min(59) as u8,
            quarter_hours: (offset_secs / QUARTER_HOUR_SECS) as i8,
        }
    }

    /// Local time right now, with the host's current UTC offset
    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now().fixed_offset())
    }

    /// Offset from UTC in quarter hours
    pub fn quarter_hours(&self) -> i8 {
        self.quarter_hours
    }

    /// Two-digit year
    pub fn year(&self) -> u8 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

fn parse_two_digits(bytes: &[u8], position: usize) -> Result<i32, TimestampError> {
    let mut value = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(TimestampError::InvalidCharacter {
                position: position + i,
                character: byte as char,
                expected: "digit",
            });
        }
        value = value * 10 + i32::from(byte - b'0');
    }
    Ok(value)
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<u8, TimestampError> {
    if !(min..=max).contains(&value) {
        return Err(TimestampError::InvalidRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value as u8)
}

fn expect_separator(bytes: &[u8], position: usize, separator: u8) -> Result<(), TimestampError> {
    if bytes[position] != separator {
        return Err(TimestampError::InvalidCharacter {
            position,
            character: bytes[position] as char,
            expected: match separator {
                b'/' => "'/'",
                b',' => "','",
                _ => "':'",
            },
        });
    }
    Ok(())
}

impl FromStr for ScTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != TIMESTAMP_LEN {
            return Err(TimestampError::InvalidLength {
                expected: TIMESTAMP_LEN,
                actual: bytes.len(),
            });
        }

        // YY/MM/DD,HH:MM:SS±QQ
        expect_separator(bytes, 2, b'/')?;
        expect_separator(bytes, 5, b'/')?;
        expect_separator(bytes, 8, b',')?;
        expect_separator(bytes, 11, b':')?;
        expect_separator(bytes, 14, b':')?;

        let sign = match bytes[17] {
            b'+' => 1,
            b'-' => -1,
            other => {
                return Err(TimestampError::InvalidCharacter {
                    position: 17,
                    character: other as char,
                    expected: "'+' or '-'",
                });
            }
        };

        let year = check_range("year", parse_two_digits(&bytes[0..2], 0)?, 0, 99)?;
        let month = check_range("month", parse_two_digits(&bytes[3..5], 3)?, 1, 12)?;
        let day = check_range("day", parse_two_digits(&bytes[6..8], 6)?, 1, 31)?;
        let hour = check_range("hour", parse_two_digits(&bytes[9..11], 9)?, 0, 23)?;
        let minute = check_range("minute", parse_two_digits(&bytes[12..14], 12)?, 0, 59)?;
        let second = check_range("second", parse_two_digits(&bytes[15..17], 15)?, 0, 59)?;
        // Real offsets stay within UTC-12..UTC+14.
        let quarters = check_range("UTC offset", parse_two_digits(&bytes[18..20], 18)?, 0, 56)?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            quarter_hours: sign * quarters as i8,
        })
    }
}

impl fmt::Display for ScTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:02},{:02}:{:02}:{:02}{:+03}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.quarter_hours
        )
    }
}

impl fmt::Debug for ScTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScTimestamp(\"{self}\")")
    }
}
