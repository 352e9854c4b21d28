// ABOUTME: Emulated GSM modem for a CTC heat pump, on a local serial port or over TCP (for example behind ser2net)
// ABOUTME: Logs what the pump sends and takes new room temperature requests from stdin

//! # CTC Heat Pump Modem
//!
//! Plays the GSM modem the controller expects, either on a serial port the
//! pump is wired to or for one TCP connection at a time. Every message the
//! pump sends is logged. Typing an integer on stdin asks the pump to change
//! its room temperature target.
//!
//! ## Usage
//!
//! ```bash
//! # Listen on the default address
//! cargo run --bin ctc-modem
//!
//! # Ask for 21 degrees as soon as the pump is activated
//! cargo run --bin ctc-modem -- --listen 127.0.0.1:7000 --temperature 21
//!
//! # Drive the pump's serial line directly
//! cargo run --bin ctc-modem -- --serial /dev/ttyUSB0 --baud 9600
//! ```

use argh::FromArgs;
use ctc_heatpump::connection::Connection;
use ctc_heatpump::datatypes::PhoneNumber;
use ctc_heatpump::serial::{DEFAULT_BAUD, SerialConnection};
use ctc_heatpump::{Heatpump, SessionConfig, SessionError, Transport};
use std::error::Error;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const REOPEN_DELAY: Duration = Duration::from_secs(1);

/// Emulated GSM modem for a CTC heat pump
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// address to accept the heat pump connection on (default: 0.0.0.0:7000)
    #[argh(option, short = 'l')]
    listen: Option<String>,

    /// serial port the heat pump is wired to, instead of listening on TCP
    #[argh(option)]
    serial: Option<String>,

    /// serial line speed (default: 9600)
    #[argh(option, short = 'b')]
    baud: Option<u32>,

    /// room temperature to request once the pump is activated
    #[argh(option, short = 't')]
    temperature: Option<i64>,

    /// telephone number the virtual message appears to come from
    #[argh(option, short = 's')]
    sender: Option<String>,
}

/// Operator input: one temperature per line
struct Console {
    lines: Lines<BufReader<Stdin>>,
    open: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if cli_args.serial.is_some() && cli_args.listen.is_some() {
        return Err("--serial and --listen cannot be combined".into());
    }

    let mut config = SessionConfig::default();
    if let Some(sender) = cli_args.sender {
        config = config.with_sender(sender.parse::<PhoneNumber>()?);
    }
    config.validate()?;

    // Carried over to the next session until the pump acknowledges it
    let mut temperature = cli_args.temperature;
    if let Some(value) = temperature {
        if value < 0 {
            return Err(SessionError::InvalidTemperature(value).into());
        }
    }

    let mut console = Console {
        lines: BufReader::new(tokio::io::stdin()).lines(),
        open: true,
    };

    if let Some(path) = cli_args.serial {
        let baud = cli_args.baud.unwrap_or(DEFAULT_BAUD);
        loop {
            let port = SerialConnection::open(&path, baud)?;
            info!("Serving the heat pump on {path} at {baud} baud");
            temperature = serve(port, &config, temperature, &mut console).await?;
            tokio::time::sleep(REOPEN_DELAY).await;
        }
    }

    let listen = cli_args.listen.unwrap_or_else(|| "0.0.0.0:7000".to_owned());
    let listener = TcpListener::bind(&listen).await?;
    info!("Waiting for the heat pump on {listen}");

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Heat pump connected from {peer}");
        temperature = serve(Connection::new(socket), &config, temperature, &mut console).await?;
    }
}

/// Run one session, returning the temperature request the pump has not
/// acknowledged yet
async fn serve<T: Transport>(
    transport: T,
    config: &SessionConfig,
    temperature: Option<i64>,
    console: &mut Console,
) -> Result<Option<i64>, Box<dyn Error>> {
    let (tx, mut messages) = mpsc::unbounded_channel();
    let mut heatpump = Heatpump::with_config(transport, config.clone())?.on_message(tx);
    if let Some(value) = temperature {
        heatpump.set_temperature(value)?;
    }
    let handle = heatpump.handle();

    {
        let session = heatpump.run();
        tokio::pin!(session);

        let Console { lines, open } = console;
        loop {
            tokio::select! {
                result = &mut session => {
                    match result {
                        Err(SessionError::ConnectionClosed) => info!("Heat pump disconnected"),
                        Err(e) => error!("Session failed: {e}"),
                        Ok(()) => debug!("Session ended"),
                    }
                    break;
                }
                Some(message) = messages.recv() => info!("Heat pump says: {message}"),
                line = lines.next_line(), if *open => match line {
                    Ok(Some(line)) => match line.trim().parse::<i64>() {
                        Ok(value) => match handle.set_temperature(value) {
                            Ok(()) => info!("Requesting room temperature {value}"),
                            Err(e) => warn!("{e}"),
                        },
                        Err(_) if line.trim().is_empty() => {}
                        Err(_) => warn!("Not a temperature: {:?}", line.trim()),
                    },
                    Ok(None) => {
                        debug!("stdin closed");
                        *open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {e}");
                        *open = false;
                    }
                },
            }
        }
    }

    while let Ok(message) = messages.try_recv() {
        info!("Heat pump says: {message}");
    }

    let temperature = heatpump
        .state()
        .temperature_change_request()
        .map(i64::from);
    if let Some(value) = temperature {
        info!("Room temperature {value} not acknowledged yet, keeping it for the next session");
    }
    Ok(temperature)
}
