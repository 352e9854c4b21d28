// ABOUTME: Routes a framed command line to its handler through the command table
// ABOUTME: Lines that match nothing are answered with ERROR and leave the session state untouched

use crate::command::{CommandMatch, CommandTable};
use crate::datatypes::{AtCommand, Reply};
use crate::frame::RawCommand;
use crate::session::error::SessionResult;
use crate::session::handlers::{self, Context};
use crate::session::traits::Transport;
use tracing::{debug, warn};

/// Run the handler registered for `command`, or answer `ERROR`
pub async fn dispatch<T: Transport>(
    table: &CommandTable,
    cx: &mut Context<'_, T>,
    command: &RawCommand,
) -> SessionResult<()> {
    let Some(found) = table.lookup(command.as_bytes()) else {
        warn!("unsupported command: {:?}", command);
        return cx.reply(&Reply::Error).await;
    };

    debug!("dispatching {} for {:?}", found.command(), command);

    match found.command() {
        AtCommand::CapacityQuery => handlers::capacity_query(cx).await,
        AtCommand::ModeSet => handlers::mode_set(cx).await,
        AtCommand::ListUnread => handlers::list_unread(cx).await,
        AtCommand::Delete => handlers::delete(cx, capture(&found)).await,
        AtCommand::SendText => handlers::send_text(cx, capture(&found)).await,
    }
}

// Handlers registered by exact bytes see an empty argument
fn capture<'a>(found: &CommandMatch<'a>) -> &'a [u8] {
    found.capture(0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScriptedTransport;
    use crate::session::config::SessionConfig;
    use crate::session::deferred::DeferredQueue;
    use crate::session::state::SessionState;

    async fn run(line: &'static [u8], state: &mut SessionState) -> Vec<u8> {
        let config = SessionConfig::default();
        let table = CommandTable::standard();
        let mut transport = ScriptedTransport::new(line);
        let mut deferred = DeferredQueue::new();

        let command = crate::frame::read_command(&mut transport).await.unwrap();
        let mut cx = Context {
            config: &config,
            state,
            transport: &mut transport,
            deferred: &mut deferred,
        };
        dispatch(&table, &mut cx, &command).await.unwrap();
        transport.take_output().to_vec()
    }

    #[tokio::test]
    async fn test_unknown_command_answers_error() {
        let mut state = SessionState::new();
        let output = run(b"at+cgmi\r\n", &mut state).await;
        assert_eq!(output, b"at+cgmi\r\nERROR\r\n");
        assert_eq!(state, SessionState::new());
    }

    #[tokio::test]
    async fn test_lone_lf_command_is_unsupported() {
        let mut state = SessionState::new();
        let output = run(b"at+cmgf=1\n", &mut state).await;
        assert_eq!(output, b"at+cmgf=1\nERROR\r\n");
    }

    #[tokio::test]
    async fn test_mode_set_routed() {
        let mut state = SessionState::new();
        let output = run(b"at+cmgf=1\r\n", &mut state).await;
        assert_eq!(output, b"at+cmgf=1\r\nOK\r\n");
    }

    #[tokio::test]
    async fn test_delete_routed_with_slot() {
        let mut state = SessionState::new();
        state.mark_read();
        let output = run(b"at+cmgd=1\r\n", &mut state).await;
        assert_eq!(output, b"at+cmgd=1\r\nOK\r\n");
        assert!(state.is_activated());
    }

    #[tokio::test]
    async fn test_delete_without_slot_is_error() {
        let mut state = SessionState::new();
        let output = run(b"at+cmgd=\r\n", &mut state).await;
        assert_eq!(output, b"at+cmgd=\r\nERROR\r\n");
    }
}
