// ABOUTME: Adapts any tokio byte stream into a modem session transport
// ABOUTME: Buffers reads in a BytesMut and flushes each write so echoes reach the pump immediately

use crate::session::Transport;
use bytes::{Buf, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::trace;

/// Stream transport for a modem session
///
/// Wraps a TCP socket, a serial bridge or an in-memory duplex. The heat
/// pump sees a modem that echoes every byte, so writes are small and
/// frequent; each one is flushed before returning.
///
/// A plain byte stream has no RTS or DTR lines. The requested levels are
/// recorded so callers can inspect them, nothing goes on the wire.
#[derive(Debug)]
pub struct Connection<S> {
    // The stream, decorated with a `BufWriter`. `write_bytes` flushes after
    // every call, so the buffer never holds bytes between writes.
    stream: BufWriter<S>,

    // Bytes read from the stream and not yet handed out.
    buffer: BytesMut,

    rts: bool,
    dtr: bool,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new `Connection`, backed by `stream`.
    pub fn new(stream: S) -> Connection<S> {
        Connection {
            stream: BufWriter::new(stream),
            // Commands are short; a small read buffer is plenty.
            buffer: BytesMut::with_capacity(1024),
            rts: false,
            dtr: false,
        }
    }

    /// Last `(rts, dtr)` levels requested
    pub fn line_control(&self) -> (bool, bool) {
        (self.rts, self.dtr)
    }

    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.stream.get_mut()
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    /// Refill the read buffer. End of stream is an `UnexpectedEof` error;
    /// the pump never closes the line in the middle of a healthy session.
    async fn fill_buffer(&mut self) -> io::Result<()> {
        if 0 == self.stream.read_buf(&mut self.buffer).await? {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            ));
        }
        Ok(())
    }
}

impl<S> Transport for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_byte(&mut self) -> io::Result<u8> {
        if self.buffer.is_empty() {
            self.fill_buffer().await?;
        }
        Ok(self.buffer.get_u8())
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    fn set_line_control(&mut self, rts: bool, dtr: bool) -> io::Result<()> {
        trace!("line control rts={} dtr={}", rts, dtr);
        self.rts = rts;
        self.dtr = dtr;
        Ok(())
    }
}
