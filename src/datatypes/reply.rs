// ABOUTME: Modem result lines written back to the heat pump
// ABOUTME: Covers final result codes, +CPMS capacity reports and +CMGL listing lines

use crate::codec::{self, Encodable};
use crate::datatypes::{PhoneNumber, ScTimestamp};
use bytes::{BufMut, BytesMut};
use std::fmt::Write as _;

/// Storage-status label used in text-mode listings for unread messages
pub const REC_UNREAD: &str = "REC UNREAD";

/// One line (or final result code) of modem output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// `+CPMS: <total>,<used>` repeated for the three storage classes
    Cpms { slots: u8, used: u8 },
    /// `+CMGL: <index>,"REC UNREAD","<sender>",,"<timestamp>"`
    CmglHeader {
        index: u8,
        sender: PhoneNumber,
        timestamp: ScTimestamp,
    },
    /// Message body, GSM 7-bit encoded
    Text(String),
    /// Empty line closing a listing entry
    Blank,
}

impl Encodable for Reply {
    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Reply::Ok => buf.put_slice(b"OK"),
            Reply::Error => buf.put_slice(b"ERROR"),
            Reply::Cpms { slots, used } => {
                let mut line = String::from("+CPMS: ");
                for storage in 0..3 {
                    if storage > 0 {
                        line.push(',');
                    }
                    let _ = write!(line, "{slots},{used}");
                }
                buf.put_slice(line.as_bytes());
            }
            Reply::CmglHeader {
                index,
                sender,
                timestamp,
            } => {
                let line = format!("+CMGL: {index},\"{REC_UNREAD}\",\"{sender}\",,\"{timestamp}\"");
                buf.put_slice(line.as_bytes());
            }
            Reply::Text(text) => codec::encode_into(text, buf),
            Reply::Blank => {}
        }
        buf.put_slice(b"\r\n");
    }
}
