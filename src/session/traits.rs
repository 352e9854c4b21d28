// ABOUTME: Interfaces the modem session needs from its surroundings
// ABOUTME: A byte transport with line control, and a sink for messages the heat pump sends

use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio::sync::mpsc;
use tracing::debug;

/// Byte-oriented duplex stream the heat pump is attached to.
///
/// Reads suspend until a byte is available; end of stream is reported as
/// [`io::ErrorKind::UnexpectedEof`].
pub trait Transport {
    /// Read a single byte
    async fn read_byte(&mut self) -> io::Result<u8>;

    /// Read exactly `n` bytes
    async fn read_bytes(&mut self, n: usize) -> io::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(n);
        for _ in 0..n {
            buf.put_u8(self.read_byte().await?);
        }
        Ok(buf.freeze())
    }

    /// Write all of `bytes` and push them out
    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Drive the RTS and DTR control lines
    fn set_line_control(&mut self, rts: bool, dtr: bool) -> io::Result<()>;
}

/// Receiver of the text messages the heat pump sends through the modem.
///
/// Called after the protocol step that received the message has finished,
/// never from inside a command handler.
pub trait MessageSink {
    fn on_message(&mut self, message: String);
}

impl<F> MessageSink for F
where
    F: FnMut(String),
{
    fn on_message(&mut self, message: String) {
        self(message)
    }
}

impl MessageSink for mpsc::UnboundedSender<String> {
    fn on_message(&mut self, message: String) {
        if self.send(message).is_err() {
            debug!("message receiver dropped, discarding heat pump message");
        }
    }
}
