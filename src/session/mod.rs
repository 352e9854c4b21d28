// ABOUTME: Emulated GSM modem session answering a CTC heat pump controller over AT commands
// ABOUTME: Exports the session controller, its configuration, state, transports and error types

//! Modem Session Module
//!
//! A CTC heat pump controller talks to a GSM modem in text mode. This module
//! plays the modem:
//!
//! * **One virtual message** - slot 1 always holds the next thing the pump
//!   should act on: the activation prompt, a temperature request or a
//!   telemetry request
//! * **Delete acknowledges** - the pump lists the slot, acts on it and
//!   deletes it, which moves the session forward
//! * **Messages out** - whatever the pump sends with `at+cmgs` is decoded
//!   and handed to a [`MessageSink`] after the command has been handled
//! * **Native async traits** - [`Transport`] uses async fn in traits, any
//!   byte stream with an echo can drive a session
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ctc_heatpump::connection::Connection;
//! use ctc_heatpump::session::Heatpump;
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = TcpStream::connect("localhost:7000").await?;
//! let mut heatpump = Heatpump::new(Connection::new(socket))
//!     .on_message(|message: String| println!("heat pump says: {message}"));
//!
//! heatpump.set_temperature(21)?;
//! heatpump.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deferred;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod heatpump;
pub mod mock;
pub mod state;
pub mod traits;

pub use config::{Clock, DEFAULT_SENDER, DEFAULT_SLOTS, SessionConfig};
pub use deferred::{Deferred, DeferredQueue};
pub use error::{SessionError, SessionResult};
pub use handlers::MAX_MESSAGE_LEN;
pub use heatpump::{Heatpump, HeatpumpHandle};
pub use mock::ScriptedTransport;
pub use state::{DeleteOutcome, OutstandingRequest, SessionState, VirtualMessage};
pub use traits::{MessageSink, Transport};
