// ABOUTME: Command table mapping framed AT command lines to session handlers
// ABOUTME: Exact byte strings are a single hash lookup, byte patterns are tried in registration order

use crate::datatypes::AtCommand;
use std::collections::HashMap;

/// One element of a command pattern.
///
/// Patterns are matched against the whole command line, anchored at both
/// ends. Capturing segments push one slice each, in pattern order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Bytes that must appear verbatim
    Literal(&'static [u8]),
    /// Zero or more spaces or tabs, not captured
    Blanks,
    /// Capture of zero or more ASCII digits
    Digits,
    /// Capture of the longest run of non-newline bytes that still lets the
    /// rest of the pattern match
    Text,
}

/// A command matcher: either a whole literal line or a segment pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matcher {
    Exact(&'static [u8]),
    Pattern(&'static [Segment]),
}

/// Result of looking a command line up in the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandMatch<'a> {
    Exact(AtCommand),
    Pattern {
        command: AtCommand,
        captures: Vec<&'a [u8]>,
    },
}

impl<'a> CommandMatch<'a> {
    pub fn command(&self) -> AtCommand {
        match self {
            CommandMatch::Exact(command) => *command,
            CommandMatch::Pattern { command, .. } => *command,
        }
    }

    /// The `n`th captured group, if the match came from a pattern
    pub fn capture(&self, n: usize) -> Option<&'a [u8]> {
        match self {
            CommandMatch::Exact(_) => None,
            CommandMatch::Pattern { captures, .. } => captures.get(n).copied(),
        }
    }
}

/// `at+cmgd=<index>`, with optional blanks before the index
pub const DELETE_PATTERN: &[Segment] = &[
    Segment::Literal(b"at+cmgd="),
    Segment::Blanks,
    Segment::Digits,
    Segment::Literal(b"\r\n"),
];

/// `at+cmgs="<address>"`
pub const SEND_PATTERN: &[Segment] = &[
    Segment::Literal(b"at+cmgs=\""),
    Segment::Text,
    Segment::Literal(b"\"\r\n"),
];

/// Ordered registry of command matchers
#[derive(Debug, Clone)]
pub struct CommandTable {
    exact: HashMap<&'static [u8], AtCommand>,
    patterns: Vec<(&'static [Segment], AtCommand)>,
}

impl CommandTable {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
        }
    }

    /// The commands a heat pump controller issues to its modem
    pub fn standard() -> Self {
        let mut table = Self::empty();

        table.register(Matcher::Exact(b"at+cpms=\"MT\"\r\n"), AtCommand::CapacityQuery);
        table.register(Matcher::Exact(b"at+cmgf=1\r\n"), AtCommand::ModeSet);
        table.register(
            Matcher::Exact(b"at+cmgl=\"REC UNREAD\"\r\n"),
            AtCommand::ListUnread,
        );
        table.register(Matcher::Pattern(DELETE_PATTERN), AtCommand::Delete);
        table.register(Matcher::Pattern(SEND_PATTERN), AtCommand::SendText);

        table
    }

    /// Add a matcher. Patterns keep registration order; a later exact entry
    /// for the same bytes replaces the earlier one.
    pub fn register(&mut self, matcher: Matcher, command: AtCommand) {
        match matcher {
            Matcher::Exact(bytes) => {
                self.exact.insert(bytes, command);
            }
            Matcher::Pattern(segments) => self.patterns.push((segments, command)),
        }
    }

    /// Find the handler for `line`.
    ///
    /// Exact entries win over patterns; among patterns the first registered
    /// match wins.
    pub fn lookup<'a>(&self, line: &'a [u8]) -> Option<CommandMatch<'a>> {
        if let Some(command) = self.exact.get(line) {
            return Some(CommandMatch::Exact(*command));
        }

        self.patterns.iter().find_map(|(segments, command)| {
            let mut captures = Vec::new();
            match_segments(segments, line, &mut captures).then(|| CommandMatch::Pattern {
                command: *command,
                captures,
            })
        })
    }

    /// Number of registered matchers
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn match_segments<'a>(segments: &[Segment], input: &'a [u8], captures: &mut Vec<&'a [u8]>) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return input.is_empty();
    };

    match *segment {
        Segment::Literal(literal) => input
            .strip_prefix(literal)
            .is_some_and(|tail| match_segments(rest, tail, captures)),
        Segment::Blanks => {
            let skip = input
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .count();
            match_segments(rest, &input[skip..], captures)
        }
        Segment::Digits => {
            let len = input.iter().take_while(|b| b.is_ascii_digit()).count();
            captures.push(&input[..len]);
            if match_segments(rest, &input[len..], captures) {
                return true;
            }
            captures.truncate(captures.len() - 1);
            false
        }
        Segment::Text => {
            let limit = input.iter().position(|&b| b == b'\n').unwrap_or(input.len());
            let mark = captures.len();
            for end in (0..=limit).rev() {
                captures.push(&input[..end]);
                if match_segments(rest, &input[end..], captures) {
                    return true;
                }
                captures.truncate(mark);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands_resolve() {
        let table = CommandTable::standard();
        assert_eq!(
            table.lookup(b"at+cpms=\"MT\"\r\n"),
            Some(CommandMatch::Exact(AtCommand::CapacityQuery))
        );
        assert_eq!(
            table.lookup(b"at+cmgf=1\r\n"),
            Some(CommandMatch::Exact(AtCommand::ModeSet))
        );
        assert_eq!(
            table.lookup(b"at+cmgl=\"REC UNREAD\"\r\n"),
            Some(CommandMatch::Exact(AtCommand::ListUnread))
        );
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let table = CommandTable::standard();
        assert_eq!(table.lookup(b"AT+CMGF=1\r\n"), None);
        assert_eq!(table.lookup(b"at+cmgl=\"rec unread\"\r\n"), None);
    }

    #[test]
    fn exact_match_requires_crlf() {
        let table = CommandTable::standard();
        assert_eq!(table.lookup(b"at+cmgf=1\n"), None);
    }

    #[test]
    fn delete_captures_slot() {
        let table = CommandTable::standard();
        let m = table.lookup(b"at+cmgd=12\r\n").unwrap();
        assert_eq!(m.command(), AtCommand::Delete);
        assert_eq!(m.capture(0), Some(&b"12"[..]));
    }

    #[test]
    fn delete_allows_blanks_before_slot() {
        let table = CommandTable::standard();
        let m = table.lookup(b"at+cmgd= 1\r\n").unwrap();
        assert_eq!(m.capture(0), Some(&b"1"[..]));
    }

    #[test]
    fn delete_without_slot_captures_empty() {
        let table = CommandTable::standard();
        let m = table.lookup(b"at+cmgd=\r\n").unwrap();
        assert_eq!(m.command(), AtCommand::Delete);
        assert_eq!(m.capture(0), Some(&b""[..]));
    }

    #[test]
    fn delete_rejects_trailing_garbage() {
        let table = CommandTable::standard();
        assert_eq!(table.lookup(b"at+cmgd=1,4\r\n"), None);
    }

    #[test]
    fn send_captures_address() {
        let table = CommandTable::standard();
        let m = table.lookup(b"at+cmgs=\"+46701111111\"\r\n").unwrap();
        assert_eq!(m.command(), AtCommand::SendText);
        assert_eq!(m.capture(0), Some(&b"+46701111111"[..]));
    }

    #[test]
    fn send_capture_is_greedy_over_quotes() {
        let table = CommandTable::standard();
        let m = table.lookup(b"at+cmgs=\"a\"b\"\r\n").unwrap();
        assert_eq!(m.capture(0), Some(&b"a\"b"[..]));
    }

    #[test]
    fn unknown_command_has_no_match() {
        let table = CommandTable::standard();
        assert_eq!(table.lookup(b"at+cgmi\r\n"), None);
        assert_eq!(table.lookup(b"at\r\n"), None);
        assert_eq!(table.lookup(b""), None);
    }

    #[test]
    fn exact_match_is_never_shadowed_by_pattern() {
        const ANY_CMGF: &[Segment] = &[
            Segment::Literal(b"at+cmgf="),
            Segment::Digits,
            Segment::Literal(b"\r\n"),
        ];
        let mut table = CommandTable::empty();
        table.register(Matcher::Pattern(ANY_CMGF), AtCommand::Delete);
        table.register(Matcher::Exact(b"at+cmgf=1\r\n"), AtCommand::ModeSet);

        assert_eq!(
            table.lookup(b"at+cmgf=1\r\n"),
            Some(CommandMatch::Exact(AtCommand::ModeSet))
        );
        assert_eq!(
            table.lookup(b"at+cmgf=0\r\n").map(|m| m.command()),
            Some(AtCommand::Delete)
        );
    }

    #[test]
    fn first_registered_pattern_wins() {
        const DIGITS: &[Segment] = &[
            Segment::Literal(b"at+x="),
            Segment::Digits,
            Segment::Literal(b"\r\n"),
        ];
        const TEXT: &[Segment] = &[
            Segment::Literal(b"at+x="),
            Segment::Text,
            Segment::Literal(b"\r\n"),
        ];
        let mut table = CommandTable::empty();
        table.register(Matcher::Pattern(DIGITS), AtCommand::Delete);
        table.register(Matcher::Pattern(TEXT), AtCommand::SendText);

        let m = table.lookup(b"at+x=5\r\n").unwrap();
        assert_eq!(m.command(), AtCommand::Delete);
        let m = table.lookup(b"at+x=abc\r\n").unwrap();
        assert_eq!(m.command(), AtCommand::SendText);
        assert_eq!(m.capture(0), Some(&b"abc"[..]));
    }

    #[test]
    fn standard_table_size() {
        let table = CommandTable::standard();
        assert_eq!(table.len(), 5);
        assert!(!table.is_empty());
        assert!(CommandTable::empty().is_empty());
    }
}
