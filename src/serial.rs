// ABOUTME: Serial port transport that drives the real RTS and DTR lines
// ABOUTME: Wraps a tokio-serial stream in a Connection for buffered, flushed I/O

use crate::connection::Connection;
use crate::session::Transport;
use std::io;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace};

/// Line speed the heat pump controller uses unless told otherwise
pub const DEFAULT_BAUD: u32 = 9600;

/// The heat pump attached directly to a local serial port.
///
/// Reads and writes behave like [`Connection`]; `set_line_control` sets
/// the port's RTS and DTR outputs.
///
/// ```rust,no_run
/// use ctc_heatpump::Heatpump;
/// use ctc_heatpump::serial::{DEFAULT_BAUD, SerialConnection};
///
/// # #[tokio::main]
/// # async fn main() -> ctc_heatpump::Result<()> {
/// let port = SerialConnection::open("/dev/ttyUSB0", DEFAULT_BAUD)?;
/// let mut heatpump = Heatpump::new(port);
/// let _ = heatpump.run().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SerialConnection {
    inner: Connection<SerialStream>,
}

impl SerialConnection {
    /// Open `path` at `baud_rate`, 8N1 without flow control
    pub fn open(path: &str, baud_rate: u32) -> io::Result<Self> {
        let stream = tokio_serial::new(path, baud_rate).open_native_async()?;
        debug!("opened {} at {} baud", path, baud_rate);
        Ok(Self::new(stream))
    }

    pub fn new(stream: SerialStream) -> Self {
        Self {
            inner: Connection::new(stream),
        }
    }

    /// Last `(rts, dtr)` levels written to the port
    pub fn line_control(&self) -> (bool, bool) {
        self.inner.line_control()
    }

    pub fn into_inner(self) -> SerialStream {
        self.inner.into_inner()
    }
}

impl Transport for SerialConnection {
    async fn read_byte(&mut self) -> io::Result<u8> {
        self.inner.read_byte().await
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_bytes(bytes).await
    }

    fn set_line_control(&mut self, rts: bool, dtr: bool) -> io::Result<()> {
        trace!("serial rts={} dtr={}", rts, dtr);
        let port = self.inner.get_mut();
        port.write_request_to_send(rts)?;
        port.write_data_terminal_ready(dtr)?;
        self.inner.set_line_control(rts, dtr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_missing_port_fails() {
        let result = SerialConnection::open("/dev/ctc-heatpump-no-such-port", DEFAULT_BAUD);
        assert!(result.is_err());
    }
}
