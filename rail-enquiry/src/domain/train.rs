//! Train number type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train number: {reason}")]
pub struct InvalidTrainNumber {
    reason: &'static str,
}

/// A five-digit train number such as `12301`.
///
/// # Examples
///
/// ```
/// use rail_enquiry::domain::TrainNumber;
///
/// let rajdhani = TrainNumber::parse("12301").unwrap();
/// assert_eq!(rajdhani.as_str(), "12301");
///
/// assert!(TrainNumber::parse("1230").is_err());
/// assert!(TrainNumber::parse("1230A").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber([u8; 5]);

impl TrainNumber {
    /// Parse a train number. Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainNumber> {
        let bytes = s.trim().as_bytes();

        if bytes.len() != 5 {
            return Err(InvalidTrainNumber {
                reason: "must be exactly 5 digits",
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidTrainNumber {
                reason: "must be ASCII digits 0-9",
            });
        }

        Ok(TrainNumber([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]))
    }

    /// Returns the train number as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.as_str())
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TrainNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrainNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TrainNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip(s in "[0-9]{5}") {
            let n = TrainNumber::parse(&s).unwrap();
            prop_assert_eq!(n.as_str(), s.as_str());
        }
    }
}
