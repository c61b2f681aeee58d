//! Address comparison and the result of checking a connected wallet against
//! the address the lobby expects.

use serde::{Deserialize, Serialize};

/// Compare two hex addresses, ignoring ASCII case.
///
/// Both strings are trimmed before comparison; an empty side never matches.
pub fn addresses_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Shorten an address for display, e.g. `0x2c75...5c23`.
///
/// Strings too short to abbreviate are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}...{tail}")
}

/// Outcome of comparing the connected wallet with the expected address.
///
/// Built once per successful connection and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    expected_address: String,
    actual_address: String,
    matches: bool,
}

impl VerificationResult {
    pub fn new(expected_address: impl Into<String>, actual_address: impl Into<String>) -> Self {
        let expected_address = expected_address.into();
        let actual_address = actual_address.into();
        let matches = addresses_match(&expected_address, &actual_address);
        Self {
            expected_address,
            actual_address,
            matches,
        }
    }

    pub fn expected_address(&self) -> &str {
        &self.expected_address
    }

    pub fn actual_address(&self) -> &str {
        &self.actual_address
    }

    pub fn matches(&self) -> bool {
        self.matches
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn comparison_ignores_case() {
        assert!(addresses_match(
            "0xABCDEF0123456789abcdef0123456789ABCDEF01",
            "0xabcdef0123456789ABCDEF0123456789abcdef01"
        ));
    }

    #[test]
    fn comparison_detects_different_digits() {
        assert!(!addresses_match(
            "0xAAA0000000000000000000000000000000000001",
            "0xBBB0000000000000000000000000000000000002"
        ));
    }

    #[test]
    fn empty_never_matches() {
        assert!(!addresses_match("", ""));
        assert!(!addresses_match("  ", "  "));
    }

    #[test]
    fn verification_result_records_both_sides() {
        let result = VerificationResult::new("0xABCDEF", "0xabcdef");
        assert!(result.matches());
        assert_eq!(result.expected_address(), "0xABCDEF");
        assert_eq!(result.actual_address(), "0xabcdef");
    }

    #[test]
    fn short_address_keeps_head_and_tail() {
        assert_eq!(
            short_address("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"),
            "0x2c75...5c23"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn verification_result_serializes_camel_case() {
        let json = serde_json::to_value(VerificationResult::new("0xa", "0xA")).unwrap();
        assert_eq!(json["expectedAddress"], "0xa");
        assert_eq!(json["actualAddress"], "0xA");
        assert_eq!(json["matches"], true);
    }
}
