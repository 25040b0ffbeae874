//! Station code types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Longest station code the enquiry site hands out.
const MAX_LEN: usize = 6;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A station code such as `NDLS` or `BCT`.
///
/// Codes are 1 to 6 uppercase ASCII letters. This type guarantees that
/// any `StationCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use rail_enquiry::domain::StationCode;
///
/// let ndls = StationCode::parse("NDLS").unwrap();
/// assert_eq!(ndls.as_str(), "NDLS");
///
/// // Lowercase is rejected
/// assert!(StationCode::parse("ndls").is_err());
///
/// // Empty is rejected
/// assert!(StationCode::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// The input must be 1 to 6 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        if s.is_empty() || s.len() > MAX_LEN {
            return Err(InvalidStationCode {
                reason: "must be 1 to 6 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidStationCode {
                reason: "must be uppercase ASCII letters A-Z",
            });
        }

        Ok(StationCode(s.to_string()))
    }

    /// Returns the station code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StationCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StationCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StationCode::parse("NDLS").is_ok());
        assert!(StationCode::parse("BCT").is_ok());
        assert!(StationCode::parse("R").is_ok());
        assert!(StationCode::parse("KSRBEN").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(StationCode::parse("ndls").is_err());
        assert!(StationCode::parse("Ndls").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(StationCode::parse("").is_err());
        assert!(StationCode::parse("ABCDEFG").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(StationCode::parse("ND1S").is_err());
        assert!(StationCode::parse("ND LS").is_err());
        assert!(StationCode::parse("ND-S").is_err());
    }

    #[test]
    fn display_and_debug() {
        let code = StationCode::parse("HWH").unwrap();
        assert_eq!(format!("{}", code), "HWH");
        assert_eq!(format!("{:?}", code), "StationCode(HWH)");
    }

    #[test]
    fn serde_roundtrip_rejects_invalid() {
        let code: StationCode = serde_json::from_str("\"NDLS\"").unwrap();
        assert_eq!(code.as_str(), "NDLS");
        assert!(serde_json::from_str::<StationCode>("\"ndls\"").is_err());
    }
}
