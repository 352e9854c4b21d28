// ABOUTME: GSM 7-bit text codec used for SMS payloads exchanged with the heat pump
// ABOUTME: Maps Unicode text to the default alphabet and the escape-extension table and back

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Byte that switches the following byte over to the extension table.
pub const ESCAPE: u8 = 0x1B;

/// Number of entries in each alphabet table.
pub const TABLE_SIZE: usize = 128;

/// GSM 03.38 default alphabet, indexed by septet value.
///
/// Index 0x1B is the escape marker itself and is never produced for a
/// character by [`encode`].
#[rustfmt::skip]
static PRIMARY: [char; TABLE_SIZE] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\x1b', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Extension table reached through [`ESCAPE`]. Unassigned indices are `None`.
static EXTENSION: [Option<char>; TABLE_SIZE] = {
    let mut table = [None; TABLE_SIZE];
    table[0x14] = Some('^');
    table[0x28] = Some('{');
    table[0x29] = Some('}');
    table[0x2F] = Some('\\');
    table[0x3C] = Some('[');
    table[0x3D] = Some('~');
    table[0x3E] = Some(']');
    table[0x40] = Some('|');
    table[0x65] = Some('€');
    table
};

/// Types that can be written onto the wire as raw modem output
pub trait Encodable {
    /// Append the wire representation to `buf`
    fn encode(&self, buf: &mut BytesMut);

    /// Convert to bytes (convenience method)
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Errors raised while decoding GSM 7-bit bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("escape byte at end of input")]
    DanglingEscape,

    #[error("byte {0:#04x} is outside the 7-bit alphabet")]
    OutOfRange(u8),

    #[error("escape index {0:#04x} has no extension character")]
    UnmappedEscape(u8),
}

fn primary_index(c: char) -> Option<u8> {
    PRIMARY
        .iter()
        .position(|&p| p == c)
        .filter(|&idx| idx != ESCAPE as usize)
        .map(|idx| idx as u8)
}

fn extension_index(c: char) -> Option<u8> {
    EXTENSION
        .iter()
        .position(|&e| e == Some(c))
        .map(|idx| idx as u8)
}

/// Returns true when every character of `text` survives [`encode`].
pub fn is_encodable(text: &str) -> bool {
    text.chars()
        .all(|c| primary_index(c).is_some() || extension_index(c).is_some())
}

/// Encode `text` into unpacked GSM 7-bit bytes (one septet per byte).
///
/// Characters present in neither table are skipped.
pub fn encode(text: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(text.len());
    encode_into(text, &mut buf);
    buf.freeze()
}

/// Encode `text` onto the end of `buf`.
pub fn encode_into(text: &str, buf: &mut BytesMut) {
    for c in text.chars() {
        if let Some(idx) = primary_index(c) {
            buf.put_u8(idx);
        } else if let Some(idx) = extension_index(c) {
            buf.put_u8(ESCAPE);
            buf.put_u8(idx);
        } else {
            tracing::trace!("dropping character {:?} with no GSM mapping", c);
        }
    }
}

/// Decode unpacked GSM 7-bit bytes into text.
pub fn decode(bytes: &[u8]) -> Result<String, CodecError> {
    let mut text = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();

    while let Some(byte) = iter.next() {
        if byte == ESCAPE {
            let idx = iter.next().ok_or(CodecError::DanglingEscape)?;
            let c = EXTENSION
                .get(idx as usize)
                .copied()
                .ok_or(CodecError::OutOfRange(idx))?
                .ok_or(CodecError::UnmappedEscape(idx))?;
            text.push(c);
        } else {
            let c = PRIMARY
                .get(byte as usize)
                .ok_or(CodecError::OutOfRange(byte))?;
            text.push(*c);
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_ascii_uses_primary_indices() {
        assert_eq!(encode("driftdata").as_ref(), b"driftdata");
        assert_eq!(encode("@$").as_ref(), &[0x00, 0x02]);
    }

    #[test]
    fn encode_national_characters() {
        assert_eq!(encode("Ä").as_ref(), &[0x5B]);
        assert_eq!(encode("å").as_ref(), &[0x0F]);
        assert_eq!(encode("ü").as_ref(), &[0x7E]);
    }

    #[test]
    fn encode_extension_characters_are_escaped() {
        assert_eq!(encode("€").as_ref(), &[ESCAPE, 0x65]);
        assert_eq!(encode("[x]").as_ref(), &[ESCAPE, 0x3C, b'x', ESCAPE, 0x3E]);
    }

    #[test]
    fn encode_drops_unsupported_characters() {
        assert_eq!(encode("rum 2°1`").as_ref(), b"rum 21");
        assert!(encode("日本").is_empty());
        // The escape marker is never a character of its own.
        assert_eq!(encode("a\u{1b}b").as_ref(), b"ab");
    }

    #[test]
    fn decode_mixed_text() {
        let bytes = [b'T', b'=', b'2', b'1', ESCAPE, 0x65, 0x7F];
        assert_eq!(decode(&bytes).unwrap(), "T=21€à");
    }

    #[test]
    fn decode_keeps_line_breaks() {
        assert_eq!(decode(b"a\r\nb").unwrap(), "a\r\nb");
    }

    #[test]
    fn decode_dangling_escape_fails() {
        assert_eq!(decode(&[b'a', ESCAPE]), Err(CodecError::DanglingEscape));
    }

    #[test]
    fn decode_out_of_range_fails() {
        assert_eq!(decode(&[b'a', 0x80]), Err(CodecError::OutOfRange(0x80)));
        assert_eq!(decode(&[ESCAPE, 0xFF]), Err(CodecError::OutOfRange(0xFF)));
    }

    #[test]
    fn decode_unmapped_escape_fails() {
        assert_eq!(decode(&[ESCAPE, 0x00]), Err(CodecError::UnmappedEscape(0x00)));
    }

    #[test]
    fn round_trip_supported_text() {
        let text = "Rum 21 {ok} ÄÖÜ äöü € ^~|\\ @£$¥ ΔΦΓΛΩΠΨΣΘΞ\r\n";
        assert_eq!(decode(&encode(text)).unwrap(), text);
    }

    #[test]
    fn round_trip_every_table_entry() {
        let primary: String = PRIMARY
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != ESCAPE as usize)
            .map(|(_, c)| *c)
            .collect();
        let extension: String = EXTENSION.iter().flatten().collect();

        assert_eq!(decode(&encode(&primary)).unwrap(), primary);
        assert_eq!(decode(&encode(&extension)).unwrap(), extension);
    }

    #[test]
    fn lossy_round_trip_removes_only_unsupported() {
        let text = "Temp: 21°C ✓ ok";
        let expected: String = text.chars().filter(|c| is_encodable(&c.to_string())).collect();
        assert_eq!(decode(&encode(text)).unwrap(), expected);
        assert_eq!(expected, "Temp: 21C  ok");
    }

    #[test]
    fn is_encodable_checks_both_tables() {
        assert!(is_encodable("aktiveranummer"));
        assert!(is_encodable("{€}"));
        assert!(!is_encodable("°"));
    }
}
