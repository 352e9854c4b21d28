// ABOUTME: Session controller driving the modem protocol loop over a transport
// ABOUTME: Owns the session state, runs at most once and releases line control on every exit path

use crate::command::CommandTable;
use crate::frame;
use crate::session::config::SessionConfig;
use crate::session::deferred::DeferredQueue;
use crate::session::dispatch::dispatch;
use crate::session::error::{SessionError, SessionResult};
use crate::session::handlers::Context;
use crate::session::state::SessionState;
use crate::session::traits::{MessageSink, Transport};
use std::future::Future;
use std::ops::{Deref, DerefMut};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// An emulated GSM modem serving one heat pump controller.
///
/// The controller polls the modem with AT commands; the session answers
/// from a single virtual message slot whose content depends on the
/// session state (activation prompt, temperature request or telemetry
/// request). Messages the controller sends back are handed to the
/// configured [`MessageSink`] after the command that carried them has been
/// fully processed.
///
/// # Example
///
/// ```rust
/// use ctc_heatpump::session::{Heatpump, ScriptedTransport, SessionError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = ScriptedTransport::new(b"at+cpms=\"MT\"\r\n");
/// let mut heatpump = Heatpump::new(transport);
/// heatpump.set_temperature(21).unwrap();
///
/// // The scripted input runs dry after one command
/// let err = heatpump.run().await.unwrap_err();
/// assert!(matches!(err, SessionError::ConnectionClosed));
/// assert!(heatpump.transport().output().ends_with(b"+CPMS: 16,1,16,1,16,1\r\n"));
/// # }
/// ```
pub struct Heatpump<T> {
    transport: T,
    core: SessionCore,
    requests_tx: mpsc::UnboundedSender<u32>,
    has_run: bool,
}

/// Cloneable handle for submitting temperature requests to a running
/// session
#[derive(Debug, Clone)]
pub struct HeatpumpHandle {
    requests: mpsc::UnboundedSender<u32>,
}

impl HeatpumpHandle {
    /// Queue a room temperature request; applied before the next command is
    /// handled, or when the session ends.
    ///
    /// Fails with [`SessionError::Detached`] once the session has finished
    /// running or has been dropped.
    pub fn set_temperature(&self, value: i64) -> SessionResult<()> {
        let value = validate_temperature(value)?;
        self.requests
            .send(value)
            .map_err(|_| SessionError::Detached)
    }
}

struct SessionCore {
    config: SessionConfig,
    table: CommandTable,
    state: SessionState,
    deferred: DeferredQueue,
    sink: Box<dyn MessageSink + Send>,
    requests: mpsc::UnboundedReceiver<u32>,
}

impl<T: Transport> Heatpump<T> {
    /// Session with the default configuration
    pub fn new(transport: T) -> Self {
        Self::build(transport, SessionConfig::default())
    }

    /// Session with a custom configuration, validated up front
    pub fn with_config(transport: T, config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;
        Ok(Self::build(transport, config))
    }

    fn build(transport: T, config: SessionConfig) -> Self {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        Self {
            transport,
            core: SessionCore {
                config,
                table: CommandTable::standard(),
                state: SessionState::new(),
                deferred: DeferredQueue::new(),
                sink: Box::new(|_message: String| {}),
                requests,
            },
            requests_tx,
            has_run: false,
        }
    }

    /// Deliver messages from the heat pump to `sink`
    pub fn on_message<S>(mut self, sink: S) -> Self
    where
        S: MessageSink + Send + 'static,
    {
        self.core.sink = Box::new(sink);
        self
    }

    pub fn handle(&self) -> HeatpumpHandle {
        HeatpumpHandle {
            requests: self.requests_tx.clone(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    /// Session state as of the last completed command
    pub fn state(&self) -> &SessionState {
        &self.core.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Ask the heat pump to change its room target.
    ///
    /// Replaces any request the pump has not acknowledged yet. Negative
    /// values are rejected.
    pub fn set_temperature(&mut self, value: i64) -> SessionResult<()> {
        let value = validate_temperature(value)?;
        self.core.apply_requests();
        self.core.state.request_temperature(value);
        debug!("temperature request set to {}", value);
        Ok(())
    }

    /// Serve the heat pump until the transport fails or closes.
    ///
    /// Only ever returns an error; end of stream is
    /// [`SessionError::ConnectionClosed`].
    pub async fn run(&mut self) -> SessionResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve the heat pump until `shutdown` completes, which ends the
    /// session with `Ok(())`.
    ///
    /// A session runs at most once; later calls fail with
    /// [`SessionError::AlreadyRun`] without touching the transport. RTS and
    /// DTR are asserted for the duration and de-asserted however the
    /// session ends, including when this future is dropped.
    pub async fn run_until<F>(&mut self, shutdown: F) -> SessionResult<()>
    where
        F: Future<Output = ()>,
    {
        if self.has_run {
            return Err(SessionError::AlreadyRun);
        }
        self.has_run = true;

        let mut running = Running {
            line: LineControl::assert(&mut self.transport)?,
            core: &mut self.core,
        };
        info!("modem session started");

        let result = tokio::select! {
            result = running.core.serve(&mut *running.line) => result,
            _ = shutdown => {
                info!("modem session shut down");
                Ok(())
            }
        };

        if let Err(err) = &result {
            info!("modem session ended: {}", err);
        }
        result
    }
}

impl SessionCore {
    async fn serve<T: Transport>(&mut self, transport: &mut T) -> SessionResult<()> {
        loop {
            self.step(transport).await?;
        }
    }

    /// One protocol step: frame a command, handle it, then deliver whatever
    /// the handler deferred
    async fn step<T: Transport>(&mut self, transport: &mut T) -> SessionResult<()> {
        let command = frame::read_command(transport).await?;
        debug!("command: {:?}", command);

        self.apply_requests();

        let mut cx = Context {
            config: &self.config,
            state: &mut self.state,
            transport,
            deferred: &mut self.deferred,
        };
        dispatch(&self.table, &mut cx, &command).await?;

        self.deferred.drain(&mut *self.sink);
        Ok(())
    }

    /// Take the last queued requests into the state and refuse later ones
    fn close_requests(&mut self) {
        self.requests.close();
        self.apply_requests();
    }

    fn apply_requests(&mut self) {
        while let Ok(value) = self.requests.try_recv() {
            debug!("temperature request set to {}", value);
            self.state.request_temperature(value);
        }
    }
}

fn validate_temperature(value: i64) -> SessionResult<u32> {
    u32::try_from(value).map_err(|_| SessionError::InvalidTemperature(value))
}

/// A session in progress. However it ends, queued temperature requests
/// are settled and the control lines released.
struct Running<'a, T: Transport> {
    line: LineControl<'a, T>,
    core: &'a mut SessionCore,
}

impl<T: Transport> Drop for Running<'_, T> {
    fn drop(&mut self) {
        self.core.close_requests();
    }
}

/// RTS/DTR held high for as long as the guard lives
struct LineControl<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> LineControl<'a, T> {
    fn assert(transport: &'a mut T) -> SessionResult<Self> {
        transport.set_line_control(true, true)?;
        Ok(Self { transport })
    }
}

impl<T: Transport> Deref for LineControl<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: Transport> DerefMut for LineControl<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: Transport> Drop for LineControl<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.transport.set_line_control(false, false) {
            warn!("failed to release line control: {}", err);
        }
    }
}
