//! Journey dates as the enquiry site expects them.

use chrono::NaiveDate;

/// Wire format for journey dates (`dd-mm-yyyy`).
const WIRE_FORMAT: &str = "%d-%m-%Y";

/// Error returned when a journey date cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid journey date {input:?}: expected dd-mm-yyyy or yyyy-mm-dd")]
pub struct InvalidJourneyDate {
    input: String,
}

/// Format a date for the `dt` / `journeyDate` query parameters.
pub fn format_journey_date(date: NaiveDate) -> String {
    date.format(WIRE_FORMAT).to_string()
}

/// Parse a journey date written either as `dd-mm-yyyy` or ISO `yyyy-mm-dd`.
pub fn parse_journey_date(s: &str) -> Result<NaiveDate, InvalidJourneyDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, WIRE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| InvalidJourneyDate {
            input: s.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_journey_date(date), "05-03-2024");
    }

    #[test]
    fn parses_both_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_journey_date("05-03-2024").unwrap(), expected);
        assert_eq!(parse_journey_date("2024-03-05").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_journey_date("tomorrow").is_err());
        assert!(parse_journey_date("31-02-2024").is_err());
    }
}
