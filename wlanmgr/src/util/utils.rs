//! Utility functions for supplicant data conversion.
//!
//! Provides helpers for turning raw BSS data into the values carried by
//! scan results: SSID bytes to identifiers, dBm to quality, hardware
//! addresses to element names.

use log::warn;
use std::str;

use crate::types::constants::{DEVICE_IDENT_PREFIX, signal};

/// Decodes SSID bytes into the raw network identifier.
///
/// Valid UTF-8 is used verbatim. Anything else is rendered with
/// `\xNN` escapes for every byte that is not printable ASCII, so it still
/// yields a stable, matchable identifier and cannot be mistaken for a
/// plain ASCII SSID. A hidden network (empty SSID) decodes to an empty
/// string.
pub(crate) fn decode_identifier(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    match str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(e) => {
            warn!("Invalid UTF-8 in SSID, escaping: {e}");
            bytes.escape_ascii().to_string()
        }
    }
}

/// Converts a signal level in dBm to a 0-100 quality.
///
/// Linear between the noise floor (0) and saturation (100).
pub(crate) fn quality_from_dbm(dbm: i16) -> u8 {
    let dbm = dbm.clamp(signal::NOISE_FLOOR_DBM, signal::SATURATION_DBM);
    (2 * (i32::from(dbm) - i32::from(signal::NOISE_FLOOR_DBM))) as u8
}

/// Builds a device element name from a colon-separated hardware address.
///
/// Returns `None` for malformed or all-zero addresses.
pub(crate) fn ident_from_mac(address: &str) -> Option<String> {
    let octets: Vec<&str> = address.trim().split(':').collect();
    if octets.len() != 6
        || octets
            .iter()
            .any(|o| o.len() != 2 || !o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return None;
    }
    if octets.iter().all(|o| *o == "00") {
        return None;
    }

    Some(format!(
        "{DEVICE_IDENT_PREFIX}{}",
        octets.concat().to_ascii_lowercase()
    ))
}

/// Macro to convert Result to Option with error logging.
/// Usage: `try_log!(result, "context message")?`
#[macro_export]
macro_rules! try_log {
    ($result:expr, $context:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: {:?}", $context, e);
                return None;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_ssid_is_verbatim() {
        assert_eq!(decode_identifier(b"HomeNet"), "HomeNet");
        assert_eq!(decode_identifier("Café".as_bytes()), "Café");
    }

    #[test]
    fn hidden_ssid_is_empty() {
        assert_eq!(decode_identifier(b""), "");
    }

    #[test]
    fn invalid_utf8_is_escaped() {
        assert_eq!(decode_identifier(&[0xff, 0x00, 0x1a]), r"\xff\x00\x1a");
        assert_eq!(decode_identifier(b"Caf\xe9"), r"Caf\xe9");
    }

    #[test]
    fn escaped_ssid_differs_from_hex_digit_ssid() {
        let raw = decode_identifier(&[0xca, 0xfe]);
        let ascii = decode_identifier(b"cafe");
        assert_eq!(ascii, "cafe");
        assert_ne!(raw, ascii);
    }

    #[test]
    fn quality_is_clamped_and_linear() {
        assert_eq!(quality_from_dbm(-120), 0);
        assert_eq!(quality_from_dbm(-100), 0);
        assert_eq!(quality_from_dbm(-65), 70);
        assert_eq!(quality_from_dbm(-50), 100);
        assert_eq!(quality_from_dbm(-20), 100);
    }

    #[test]
    fn mac_ident() {
        assert_eq!(
            ident_from_mac("AA:bb:0C:11:22:33\n").as_deref(),
            Some("dev_aabb0c112233")
        );
        assert_eq!(ident_from_mac("00:00:00:00:00:00"), None);
        assert_eq!(ident_from_mac("aa:bb"), None);
        assert_eq!(ident_from_mac("zz:bb:cc:dd:ee:ff"), None);
    }
}
