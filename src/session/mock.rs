// ABOUTME: In-memory transport that replays scripted input and records everything written
// ABOUTME: Lets sessions run in tests without a serial port or socket

use crate::session::traits::Transport;
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::io;

/// A scripted transport for testing.
///
/// Reads come from the input given at construction (plus anything pushed
/// later). Once it runs dry, reads fail with
/// [`io::ErrorKind::UnexpectedEof`], or wait forever if the transport is
/// held open.
///
/// # Example
///
/// ```
/// use ctc_heatpump::session::{ScriptedTransport, Transport};
///
/// # #[tokio::main]
/// # async fn main() -> std::io::Result<()> {
/// let mut transport = ScriptedTransport::new(b"at");
/// assert_eq!(transport.read_byte().await?, b'a');
/// transport.write_bytes(b"OK\r\n").await?;
/// assert_eq!(transport.output(), b"OK\r\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    input: VecDeque<u8>,
    output: BytesMut,
    hold_open: bool,
    line_control: (bool, bool),
    line_history: Vec<(bool, bool)>,
}

impl ScriptedTransport {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Suspend reads on empty input instead of reporting end of stream
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Bytes not read yet
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take everything written so far, leaving the record empty
    pub fn take_output(&mut self) -> Bytes {
        self.output.split().freeze()
    }

    /// Current `(rts, dtr)` levels
    pub fn line_control(&self) -> (bool, bool) {
        self.line_control
    }

    /// Every `(rts, dtr)` change, oldest first
    pub fn line_history(&self) -> &[(bool, bool)] {
        &self.line_history
    }
}

impl Transport for ScriptedTransport {
    async fn read_byte(&mut self) -> io::Result<u8> {
        match self.input.pop_front() {
            Some(byte) => Ok(byte),
            None if self.hold_open => std::future::pending().await,
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            )),
        }
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn set_line_control(&mut self, rts: bool, dtr: bool) -> io::Result<()> {
        self.line_control = (rts, dtr);
        self.line_history.push((rts, dtr));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_in_order_then_eof() {
        let mut transport = ScriptedTransport::new(b"ab");
        assert_eq!(transport.read_byte().await.unwrap(), b'a');
        assert_eq!(transport.read_byte().await.unwrap(), b'b');
        let err = transport.read_byte().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_read_bytes_default() {
        let mut transport = ScriptedTransport::new(b"hello");
        let bytes = transport.read_bytes(3).await.unwrap();
        assert_eq!(&bytes[..], b"hel");
        assert_eq!(transport.remaining_input(), 2);
    }

    #[tokio::test]
    async fn test_push_input_after_start() {
        let mut transport = ScriptedTransport::new(b"");
        transport.push_input(b"x");
        assert_eq!(transport.read_byte().await.unwrap(), b'x');
    }

    #[tokio::test]
    async fn test_held_open_read_waits() {
        let mut transport = ScriptedTransport::new(b"").hold_open();
        let read = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            transport.read_byte(),
        )
        .await;
        assert!(read.is_err());
    }

    #[tokio::test]
    async fn test_records_output_and_lines() {
        let mut transport = ScriptedTransport::new(b"");
        transport.write_bytes(b"OK\r\n").await.unwrap();
        transport.set_line_control(true, true).unwrap();
        transport.set_line_control(false, false).unwrap();

        assert_eq!(transport.take_output(), Bytes::from_static(b"OK\r\n"));
        assert!(transport.output().is_empty());
        assert_eq!(transport.line_control(), (false, false));
        assert_eq!(transport.line_history(), &[(true, true), (false, false)]);
    }
}
