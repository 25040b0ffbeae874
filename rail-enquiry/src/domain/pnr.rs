//! PNR (passenger name record) numbers.

use std::fmt;

/// Error returned when parsing an invalid PNR number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid PNR number: {reason}")]
pub struct InvalidPnr {
    reason: &'static str,
}

/// A ten-digit booking reference.
///
/// ```
/// use rail_enquiry::domain::Pnr;
///
/// assert!(Pnr::parse("4512345678").is_ok());
/// assert!(Pnr::parse("451234567").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Pnr(String);

impl Pnr {
    pub fn parse(s: &str) -> Result<Self, InvalidPnr> {
        let s = s.trim();
        if s.len() != 10 {
            return Err(InvalidPnr {
                reason: "must be exactly 10 digits",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPnr {
                reason: "must be ASCII digits 0-9",
            });
        }
        Ok(Pnr(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pnr({})", self.0)
    }
}

impl fmt::Display for Pnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_pnr() {
        assert_eq!(Pnr::parse("4512345678").unwrap().as_str(), "4512345678");
        assert_eq!(Pnr::parse(" 4512345678\n").unwrap().as_str(), "4512345678");
    }

    #[test]
    fn reject_invalid_pnr() {
        assert!(Pnr::parse("").is_err());
        assert!(Pnr::parse("45123456789").is_err());
        assert!(Pnr::parse("45123x5678").is_err());
    }
}
