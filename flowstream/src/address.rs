//! EVM addresses as typed in by the user and shown back to them.
//!
//! The address type itself is `alloy_primitives::Address`. This module adds
//! the strict `0x` parsing the command line expects and the short badge form.

pub use alloy_primitives::Address;

use crate::error::StreamError;

/// Parse `0x` followed by 40 hex digits, in any letter case.
///
/// Mixed-case input is not checked against its EIP-55 checksum.
pub fn parse_address(s: &str) -> Result<Address, StreamError> {
    let s = s.trim();
    if !s.starts_with("0x") {
        return Err(StreamError::InvalidAddress(format!(
            "{} is missing the 0x prefix",
            s
        )));
    }
    s.parse::<Address>()
        .map_err(|e| StreamError::InvalidAddress(format!("{}: {}", s, e)))
}

/// Abbreviated checksum form for the connected-wallet badge, e.g. `0x5a...eAed`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..4], &full[38..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIP55_SAMPLE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_parse_any_case() {
        let lower = parse_address(&EIP55_SAMPLE.to_lowercase()).unwrap();
        let mixed = parse_address(EIP55_SAMPLE).unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(lower.to_checksum(None), EIP55_SAMPLE);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            Err(StreamError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("0x1234"),
            Err(StreamError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            Err(StreamError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_short_form() {
        let addr = parse_address(EIP55_SAMPLE).unwrap();
        assert_eq!(short_address(&addr), "0x5a...eAed");
    }

    #[test]
    fn test_serde_round_trip() {
        let addr = parse_address(EIP55_SAMPLE).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
