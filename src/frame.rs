// ABOUTME: AT command framing over an echoing byte transport
// ABOUTME: Hunts for lines starting with "at" and returns them whole, echoing every byte it consumes

use crate::session::Transport;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::io;
use tracing::warn;

/// Two-byte prefix every command line starts with
pub const COMMAND_PREFIX: &[u8; 2] = b"at";

/// Longest command line accepted, terminator included
pub const MAX_COMMAND_LEN: usize = 512;

/// A complete command line as received, always terminated by `\n`.
#[derive(Clone, PartialEq, Eq)]
pub struct RawCommand(Bytes);

impl RawCommand {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawCommand(\"{}\")", self.0.escape_ascii())
    }
}

impl AsRef<[u8]> for RawCommand {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Where the framer is while looking for the start of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hunt {
    /// Expecting `COMMAND_PREFIX[n]`
    Prefix(usize),
    /// Discarding bytes up to the next newline
    SkipLine,
}

/// Read one byte and write it straight back.
pub async fn read_and_echo<T: Transport>(transport: &mut T) -> io::Result<u8> {
    let byte = transport.read_byte().await?;
    transport.write_bytes(&[byte]).await?;
    Ok(byte)
}

/// Read the next command line from `transport`.
///
/// Every byte consumed is echoed, including the ones that are discarded
/// while hunting for the prefix. The returned command starts with `at` and
/// ends with `\n`.
pub async fn read_command<T: Transport>(transport: &mut T) -> io::Result<RawCommand> {
    let mut buf = BytesMut::with_capacity(64);

    'frame: loop {
        buf.clear();
        let mut hunt = Hunt::Prefix(0);

        while hunt != Hunt::Prefix(COMMAND_PREFIX.len()) {
            let byte = read_and_echo(transport).await?;
            hunt = match hunt {
                Hunt::Prefix(n) if byte == COMMAND_PREFIX[n] => {
                    buf.put_u8(byte);
                    Hunt::Prefix(n + 1)
                }
                Hunt::Prefix(_) => {
                    buf.clear();
                    if byte == b'\n' {
                        Hunt::Prefix(0)
                    } else {
                        Hunt::SkipLine
                    }
                }
                Hunt::SkipLine if byte == b'\n' => Hunt::Prefix(0),
                Hunt::SkipLine => Hunt::SkipLine,
            };
        }

        loop {
            let byte = read_and_echo(transport).await?;
            buf.put_u8(byte);
            if byte == b'\n' {
                return Ok(RawCommand(buf.split().freeze()));
            }
            if buf.len() >= MAX_COMMAND_LEN {
                warn!(
                    "discarding command line longer than {} bytes: {:?}...",
                    MAX_COMMAND_LEN,
                    buf[..16].escape_ascii().to_string()
                );
                skip_line(transport).await?;
                continue 'frame;
            }
        }
    }
}

/// Read and echo the rest of the current line, up to and including `\n`.
///
/// Returns `None` if the line grew beyond `max_len`; the remainder of the
/// line is still consumed.
pub async fn read_line<T: Transport>(
    transport: &mut T,
    max_len: usize,
) -> io::Result<Option<Bytes>> {
    let mut buf = BytesMut::with_capacity(max_len.min(256));

    loop {
        let byte = read_and_echo(transport).await?;
        buf.put_u8(byte);
        if byte == b'\n' {
            return Ok(Some(buf.freeze()));
        }
        if buf.len() >= max_len {
            skip_line(transport).await?;
            return Ok(None);
        }
    }
}

async fn skip_line<T: Transport>(transport: &mut T) -> io::Result<()> {
    while read_and_echo(transport).await? != b'\n' {}
    Ok(())
}
