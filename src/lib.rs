pub mod codec;
pub mod command;
pub mod connection;
pub mod datatypes;
pub mod frame;
pub mod serial;
pub mod session;


// Re-export codec types for direct access
pub use codec::{CodecError, Encodable};

// Re-export the session API for easy access
pub use session::{
    Heatpump, HeatpumpHandle, MessageSink, SessionConfig, SessionError, SessionResult, Transport,
};

/// Error returned by the binary and other top-level glue.
///
/// Library operations return [`SessionError`] or [`CodecError`]; this boxed
/// type is for code that mixes them with socket and stdin errors.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for top-level glue.
///
/// # Examples
///
/// ## Serving a heat pump over TCP
///
/// The pump's serial line is usually bridged to TCP (for example with
/// ser2net). Each connection gets its own session:
///
/// ```rust,no_run
/// use ctc_heatpump::connection::Connection;
/// use ctc_heatpump::{Heatpump, SessionError};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() -> ctc_heatpump::Result<()> {
///     let listener = TcpListener::bind("0.0.0.0:7000").await?;
///
///     loop {
///         let (socket, peer) = listener.accept().await?;
///         println!("heat pump connected from {}", peer);
///
///         let mut heatpump = Heatpump::new(Connection::new(socket))
///             .on_message(|message: String| println!("heat pump: {}", message));
///
///         match heatpump.run().await {
///             Err(SessionError::ConnectionClosed) => println!("heat pump disconnected"),
///             Err(err) => return Err(err.into()),
///             Ok(()) => {}
///         }
///     }
/// }
/// ```
///
/// ## Changing the room temperature while the session runs
///
/// ```rust,no_run
/// use ctc_heatpump::connection::Connection;
/// use ctc_heatpump::Heatpump;
/// use tokio::net::TcpStream;
///
/// #[tokio::main]
/// async fn main() -> ctc_heatpump::Result<()> {
///     let socket = TcpStream::connect("localhost:7000").await?;
///     let (tx, mut messages) = tokio::sync::mpsc::unbounded_channel();
///     let mut heatpump = Heatpump::new(Connection::new(socket)).on_message(tx);
///     let handle = heatpump.handle();
///
///     let session = heatpump.run();
///     tokio::pin!(session);
///
///     handle.set_temperature(22)?;
///     loop {
///         tokio::select! {
///             result = &mut session => return Ok(result?),
///             Some(message) = messages.recv() => println!("heat pump: {}", message),
///         }
///     }
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
