mod address;
mod at_command;
mod reply;
mod timestamp;

pub use address::{AddressError, MAX_ADDRESS_LEN, PhoneNumber};
pub use at_command::AtCommand;
pub use reply::{REC_UNREAD, Reply};
pub use timestamp::{ScTimestamp, TIMESTAMP_LEN, TimestampError};
