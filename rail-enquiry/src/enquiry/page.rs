//! Enquiry types served by the unified enquiry endpoint.

use serde_json::Value;

use super::error::EnquiryError;

/// The message the site returns when the captcha session has lapsed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session out or Bot attack";

/// Trains between stations table columns.
pub const TRAINS_BETWEEN_COLUMNS: &[&str] = &[
    "trainName",
    "trainNumber",
    "fromStnCode",
    "toStnCode",
    "departureTime",
    "arrivalTime",
    "duration",
    "distance",
    "runningMon",
    "runningTue",
    "runningWed",
    "runningThu",
    "runningFri",
    "runningSat",
    "runningSun",
    "avlClasses",
    "trainType",
];

/// Seat availability table columns. The misspelling is upstream's.
pub const SEAT_AVAILABILITY_COLUMNS: &[&str] = &[
    "availablityDate",
    "availablityStatus",
    "availablityType",
    "currentBkgFlag",
    "reason",
    "reasonType",
    "waitListType",
];

/// Train schedule table columns.
pub const SCHEDULE_COLUMNS: &[&str] = &[
    "stationCode",
    "stationName",
    "departureTime",
    "arrivalTime",
    "routeNumber",
    "haltTime",
    "distance",
    "dayCount",
    "stnSerialNumber",
];

/// Fare fields kept from a fare response, in display order.
pub const FARE_COLUMNS: &[&str] = &[
    "baseFare",
    "reservationCharge",
    "superfastCharge",
    "fuelAmount",
    "totalConcession",
    "tatkalFare",
    "goodsServiceTax",
    "otherCharge",
    "cateringCharge",
    "dynamicFare",
    "totalFare",
    "wpServiceCharge",
    "wpServiceTax",
    "travelInsuranceCharge",
    "travelInsuranceServiceTax",
    "totalCollectibleAmount",
];

/// An enquiry type, sent as the `inputPage` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnquiryPage {
    TrainsBetween,
    SeatAvailability,
    Fare,
    Schedule,
    Pnr,
}

impl EnquiryPage {
    pub fn input_page(self) -> &'static str {
        match self {
            EnquiryPage::TrainsBetween => "TBIS",
            EnquiryPage::SeatAvailability => "SEAT",
            EnquiryPage::Fare => "FARE",
            EnquiryPage::Schedule => "TBIS_SCHEDULE_CALL",
            EnquiryPage::Pnr => "PNR",
        }
    }

    /// Key holding the result list, or `None` when the whole body is the
    /// result.
    pub fn result_key(self) -> Option<&'static str> {
        match self {
            EnquiryPage::TrainsBetween => Some("trainBtwnStnsList"),
            EnquiryPage::SeatAvailability => Some("avlDayList"),
            EnquiryPage::Schedule => Some("stationList"),
            EnquiryPage::Fare | EnquiryPage::Pnr => None,
        }
    }

    /// Table columns for list results.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            EnquiryPage::TrainsBetween => TRAINS_BETWEEN_COLUMNS,
            EnquiryPage::SeatAvailability => SEAT_AVAILABILITY_COLUMNS,
            EnquiryPage::Schedule => SCHEDULE_COLUMNS,
            EnquiryPage::Fare => FARE_COLUMNS,
            EnquiryPage::Pnr => &[],
        }
    }

    /// Pull the result out of a response body.
    ///
    /// A present result wins over any error message. Otherwise the site's
    /// `errorMessage` decides between session expiry and a rejected
    /// enquiry; a body with neither is malformed.
    pub fn extract(self, mut body: Value) -> Result<Value, EnquiryError> {
        match self.result_key() {
            Some(key) => {
                if let Some(result) = body.get_mut(key)
                    && !result.is_null()
                {
                    return Ok(result.take());
                }
            }
            None => {
                if body.is_object() && error_message(&body).is_none() {
                    return Ok(body);
                }
            }
        }

        match error_message(&body) {
            Some(message) if message.eq_ignore_ascii_case(SESSION_EXPIRED_MESSAGE) => {
                Err(EnquiryError::SessionExpired)
            }
            Some(message) => Err(EnquiryError::Upstream {
                message: message.to_string(),
            }),
            None => Err(EnquiryError::MalformedResponse {
                page: self.input_page(),
                reason: match self.result_key() {
                    Some(key) => format!("no {key} and no errorMessage"),
                    None => "expected a JSON object".to_string(),
                },
            }),
        }
    }
}

/// Non-empty `errorMessage` of a response body.
fn error_message(body: &Value) -> Option<&str> {
    body.get("errorMessage")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_key_is_extracted() {
        let body = json!({"avlDayList": [{"availablityStatus": "AVAILABLE-0042"}], "errorMessage": null});
        let result = EnquiryPage::SeatAvailability.extract(body).unwrap();
        assert_eq!(result, json!([{"availablityStatus": "AVAILABLE-0042"}]));
    }

    #[test]
    fn session_expiry_is_detected() {
        let body = json!({"errorMessage": "Session out or Bot attack"});
        let err = EnquiryPage::TrainsBetween.extract(body).unwrap_err();
        assert!(matches!(err, EnquiryError::SessionExpired));
    }

    #[test]
    fn other_error_messages_are_upstream_errors() {
        let body = json!({"errorMessage": "Train does not run on this date"});
        match EnquiryPage::Schedule.extract(body).unwrap_err() {
            EnquiryError::Upstream { message } => {
                assert_eq!(message, "Train does not run on this date")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pnr_error_is_upstream_error() {
        let body = json!({"errorMessage": "FLUSHED PNR / PNR NOT YET GENERATED"});
        let err = EnquiryPage::Pnr.extract(body).unwrap_err();
        assert!(matches!(err, EnquiryError::Upstream { .. }));
    }

    #[test]
    fn whole_body_pages_return_the_object() {
        let body = json!({"pnrNumber": "4512345678", "errorMessage": ""});
        let result = EnquiryPage::Pnr.extract(body.clone()).unwrap();
        assert_eq!(result, body);
    }

    #[test]
    fn missing_result_without_message_is_malformed() {
        let err = EnquiryPage::TrainsBetween.extract(json!({"foo": 1})).unwrap_err();
        match err {
            EnquiryError::MalformedResponse { page, reason } => {
                assert_eq!(page, "TBIS");
                assert!(reason.contains("trainBtwnStnsList"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = EnquiryPage::Fare.extract(json!([1, 2])).unwrap_err();
        assert!(matches!(err, EnquiryError::MalformedResponse { .. }));
    }

    #[test]
    fn null_result_is_not_a_result() {
        let body = json!({"stationList": null, "errorMessage": "Invalid train"});
        let err = EnquiryPage::Schedule.extract(body).unwrap_err();
        assert!(matches!(err, EnquiryError::Upstream { .. }));
    }
}
