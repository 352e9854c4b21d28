// ABOUTME: Strongly-typed phone number used as the originating address of virtual SMS
// ABOUTME: Validates digits with an optional leading '+' and a bounded length

use std::fmt;
use std::str;
use std::str::FromStr;
use thiserror::Error;

/// Longest address the modem will report, excluding the quotes around it.
pub const MAX_ADDRESS_LEN: usize = 20;

/// Errors raised while validating an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address too long: {actual_len} characters, max {max_len}")]
    TooLong { max_len: usize, actual_len: usize },

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },
}

/// A phone number made of ASCII digits with an optional leading `+`.
///
/// Stored inline so it can be copied into replies without allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhoneNumber {
    data: [u8; MAX_ADDRESS_LEN],
    length: u8,
}

impl PhoneNumber {
    /// Creates a new PhoneNumber with format validation
    pub fn new(addr: &str) -> Result<Self, AddressError> {
        if addr.is_empty() {
            return Err(AddressError::Empty);
        }
        if addr.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong {
                max_len: MAX_ADDRESS_LEN,
                actual_len: addr.len(),
            });
        }

        for (position, character) in addr.chars().enumerate() {
            let valid = character.is_ascii_digit() || (position == 0 && character == '+');
            if !valid {
                return Err(AddressError::InvalidCharacter {
                    position,
                    character,
                });
            }
        }

        // A lone '+' has no digits.
        if addr == "+" {
            return Err(AddressError::Empty);
        }

        let mut data = [0u8; MAX_ADDRESS_LEN];
        data[..addr.len()].copy_from_slice(addr.as_bytes());

        Ok(Self {
            data,
            length: addr.len() as u8,
        })
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        // Only ASCII digits and '+' are ever stored.
        str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Returns the address as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.length as usize]
    }

    /// Returns the length of the address
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Always false, construction rejects empty addresses
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True for numbers written in international `+<digits>` form
    pub fn is_international(&self) -> bool {
        self.as_bytes().first() == Some(&b'+')
    }
}

impl FromStr for PhoneNumber {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhoneNumber(\"{}\")", self.as_str())
    }
}

impl AsRef<[u8]> for PhoneNumber {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<&str> for PhoneNumber {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_international() {
        let phone = PhoneNumber::new("+46701111111").unwrap();
        assert_eq!(phone.as_str(), "+46701111111");
        assert_eq!(phone.len(), 12);
        assert!(phone.is_international());
    }

    #[test]
    fn test_phone_number_national() {
        let phone: PhoneNumber = "0701111111".parse().unwrap();
        assert_eq!(phone, "0701111111");
        assert!(!phone.is_international());
    }

    #[test]
    fn test_phone_number_rejects_letters() {
        let result = PhoneNumber::new("+4670abc");
        assert_eq!(
            result,
            Err(AddressError::InvalidCharacter {
                position: 5,
                character: 'a'
            })
        );
    }

    #[test]
    fn test_phone_number_plus_only_at_start() {
        assert!(matches!(
            PhoneNumber::new("46+70"),
            Err(AddressError::InvalidCharacter { position: 2, .. })
        ));
    }

    #[test]
    fn test_phone_number_empty() {
        assert_eq!(PhoneNumber::new(""), Err(AddressError::Empty));
        assert_eq!(PhoneNumber::new("+"), Err(AddressError::Empty));
    }

    #[test]
    fn test_phone_number_too_long() {
        let long_number = "1".repeat(MAX_ADDRESS_LEN + 1);
        assert!(matches!(
            PhoneNumber::new(&long_number),
            Err(AddressError::TooLong { .. })
        ));
    }

    #[test]
    fn test_phone_number_display() {
        let phone = PhoneNumber::new("+46701111111").unwrap();
        assert_eq!(format!("{}", phone), "+46701111111");
        assert_eq!(format!("{:?}", phone), "PhoneNumber(\"+46701111111\")");
    }
}
