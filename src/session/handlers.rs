// ABOUTME: Command handlers of the emulated modem, one per supported AT command
// ABOUTME: Each handler applies one state transition and writes its own reply through the transport

use crate::codec::{self, Encodable};
use crate::datatypes::Reply;
use crate::frame;
use crate::session::config::SessionConfig;
use crate::session::deferred::{Deferred, DeferredQueue};
use crate::session::error::SessionResult;
use crate::session::state::{DeleteOutcome, SessionState};
use crate::session::traits::Transport;
use tracing::{debug, info, warn};

/// Longest message body accepted after `at+cmgs`, terminator included
pub const MAX_MESSAGE_LEN: usize = 512;

/// Everything a handler may touch during one protocol step
pub struct Context<'a, T> {
    pub config: &'a SessionConfig,
    pub state: &'a mut SessionState,
    pub transport: &'a mut T,
    pub deferred: &'a mut DeferredQueue,
}

impl<T: Transport> Context<'_, T> {
    pub async fn reply(&mut self, reply: &Reply) -> SessionResult<()> {
        debug!("reply: {:?}", reply);
        self.transport.write_bytes(&reply.to_bytes()).await?;
        Ok(())
    }
}

/// `at+cpms="MT"`: report slot capacity
pub async fn capacity_query<T: Transport>(cx: &mut Context<'_, T>) -> SessionResult<()> {
    let reply = Reply::Cpms {
        slots: cx.config.slots,
        used: cx.state.used_slots(),
    };
    cx.reply(&reply).await
}

/// `at+cmgf=1`: text mode is the only mode, accept it
pub async fn mode_set<T: Transport>(cx: &mut Context<'_, T>) -> SessionResult<()> {
    cx.reply(&Reply::Ok).await
}

/// `at+cmgl="REC UNREAD"`: list the virtual message unless the pump is
/// in the middle of answering
pub async fn list_unread<T: Transport>(cx: &mut Context<'_, T>) -> SessionResult<()> {
    if cx.state.has_unread() {
        let message = cx.state.current_message();
        let text = message.text(cx.config);
        debug!("listing {:?} as {:?}", message, text);

        let header = Reply::CmglHeader {
            index: 1,
            sender: cx.config.sender,
            timestamp: cx.config.clock.timestamp(),
        };
        cx.state.mark_read();
        cx.reply(&header).await?;
        cx.reply(&Reply::Text(text)).await?;
        cx.reply(&Reply::Blank).await?;
    }

    cx.reply(&Reply::Ok).await
}

/// `at+cmgd=<index>`: deleting slot 1 after listing it acknowledges the
/// virtual message
pub async fn delete<T: Transport>(cx: &mut Context<'_, T>, index: &[u8]) -> SessionResult<()> {
    let slot = parse_index(index).filter(|slot| (1..=u32::from(cx.config.slots)).contains(slot));

    let Some(slot) = slot else {
        warn!("delete of invalid slot {:?}", index.escape_ascii().to_string());
        return cx.reply(&Reply::Error).await;
    };

    if slot == 1 {
        match cx.state.delete_first_slot() {
            DeleteOutcome::NotRead => debug!("slot 1 deleted before being read"),
            outcome => info!("heat pump {}", outcome),
        }
    }

    cx.reply(&Reply::Ok).await
}

/// `at+cmgs="<address>"`: take the message body from the next line and
/// queue it for the sink
pub async fn send_text<T: Transport>(cx: &mut Context<'_, T>, address: &[u8]) -> SessionResult<()> {
    cx.state.begin_request();

    let line = frame::read_line(cx.transport, MAX_MESSAGE_LEN).await?;
    let message = match line {
        Some(line) => match codec::decode(trim_line_end(&line)) {
            Ok(text) => {
                info!(
                    "heat pump message to {}: {:?}",
                    String::from_utf8_lossy(address),
                    text
                );
                Some(text)
            }
            Err(err) => {
                warn!("dropping undecodable heat pump message: {}", err);
                None
            }
        },
        None => {
            warn!("dropping heat pump message longer than {} bytes", MAX_MESSAGE_LEN);
            None
        }
    };

    if let Some(text) = &message {
        cx.deferred.push(Deferred::Notify(text.clone()));
    }
    cx.state.finish_request(message);
    Ok(())
}

fn parse_index(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u32::from(d - b'0'))
    })
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
