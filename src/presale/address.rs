use std::fmt;
use thiserror::Error;

const PREFIX: &str = "0x";
const ADDRESS_LEN: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Please enter your Ethereum wallet address")]
    Empty,
    #[error("Please enter a valid Ethereum wallet address (42 characters starting with 0x)")]
    Malformed,
}

/// An address with the `0x` + 40 character shape. Hex digits and checksum
/// casing are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        if !Self::looks_like(trimmed) {
            return Err(AddressError::Malformed);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Length is counted in UTF-16 units, the same units the short code
    /// hash folds over.
    pub fn looks_like(value: &str) -> bool {
        value.starts_with(PREFIX) && value.encode_utf16().count() == ADDRESS_LEN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn abbreviated(&self) -> String {
        abbreviate(&self.0)
    }
}

/// `0x1234...abcd`. Values too short to abbreviate are returned as is.
pub fn abbreviate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        return value.to_string();
    }
    let prefix: String = chars[..6].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn accepts_prefixed_42_char_values() {
        let address = WalletAddress::parse(&format!("  {VALID}\n")).unwrap();
        assert_eq!(address.as_str(), VALID);
        assert_eq!(address.abbreviated(), "0xf39f...2266");
    }

    #[test]
    fn checks_shape_only() {
        let not_hex = format!("0x{}", "z".repeat(40));
        assert!(WalletAddress::parse(&not_hex).is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert_eq!(WalletAddress::parse("   "), Err(AddressError::Empty));
        assert_eq!(
            WalletAddress::parse(&VALID[..41]),
            Err(AddressError::Malformed)
        );
        assert_eq!(
            WalletAddress::parse(&format!("1x{}", &VALID[2..])),
            Err(AddressError::Malformed)
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 22 characters but 42 bytes
        let short = format!("0x{}", "é".repeat(20));
        assert_eq!(WalletAddress::parse(&short), Err(AddressError::Malformed));
        assert!(!WalletAddress::looks_like(&short));

        let long = format!("0x{}", "é".repeat(40));
        assert!(WalletAddress::parse(&long).is_ok());
    }

    #[test]
    fn abbreviate_leaves_short_values() {
        assert_eq!(abbreviate("0x1234"), "0x1234");
    }
}
