// ABOUTME: Identifiers for the AT commands the emulated modem understands
// ABOUTME: Each variant names one handler of the session state machine

use std::fmt;

/// Handler identifier produced by the command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtCommand {
    /// `at+cpms="MT"` - preferred message storage / capacity query
    CapacityQuery,
    /// `at+cmgf=1` - select text mode
    ModeSet,
    /// `at+cmgl="REC UNREAD"` - list unread messages
    ListUnread,
    /// `at+cmgd=<index>` - delete message
    Delete,
    /// `at+cmgs="<address>"` - send message, body follows on the next line
    SendText,
}

impl AtCommand {
    /// The AT command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            AtCommand::CapacityQuery => "+CPMS",
            AtCommand::ModeSet => "+CMGF",
            AtCommand::ListUnread => "+CMGL",
            AtCommand::Delete => "+CMGD",
            AtCommand::SendText => "+CMGS",
        }
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
