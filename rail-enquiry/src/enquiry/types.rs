//! Query inputs and typed views of enquiry responses.
//!
//! The views use `Option` liberally because the site omits fields rather
//! than sending nulls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::page::FARE_COLUMNS;
use crate::table::Table;

/// Where and when to travel. Anything left out falls back to the client's
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyQuery {
    /// Station code or name
    pub source: Option<String>,
    /// Station code or name
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}

impl JourneyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, station: impl Into<String>) -> Self {
        self.source = Some(station.into());
        self
    }

    pub fn destination(mut self, station: impl Into<String>) -> Self {
        self.destination = Some(station.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// One train from a trains-between-stations enquiry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainSummary {
    pub train_number: String,
    pub train_name: Option<String>,
    pub from_stn_code: Option<String>,
    pub to_stn_code: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub duration: Option<String>,
    /// Class codes with reservable accommodation.
    #[serde(default)]
    pub avl_classes: Vec<String>,
}

/// One day of a seat availability enquiry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AvailabilityDay {
    #[serde(rename = "availablityDate")]
    pub date: Option<String>,
    /// e.g. `AVAILABLE-0042`, `GNWL12/WL5`, `REGRET/WL`
    #[serde(rename = "availablityStatus")]
    pub status: Option<String>,
    #[serde(rename = "availablityType")]
    pub availability_type: Option<String>,
    #[serde(rename = "currentBkgFlag")]
    pub current_booking_flag: Option<String>,
    pub reason: Option<String>,
}

impl AvailabilityDay {
    /// Whether seats can be booked outright on this day.
    pub fn is_available(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.contains("AVAILABLE-"))
    }
}

/// Fare components present in a fare response, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FareBreakdown {
    entries: Vec<(&'static str, Value)>,
}

impl FareBreakdown {
    /// Keep only the known fare fields of a response body.
    pub fn from_response(body: &Value) -> Self {
        let entries = FARE_COLUMNS
            .iter()
            .filter_map(|&column| body.get(column).map(|v| (column, v.clone())))
            .collect();
        Self { entries }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, v)| v)
    }

    /// Total fare, whether the site sent it as a number or a string.
    pub fn total_fare(&self) -> Option<f64> {
        match self.get("totalFare")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, v)| (*name, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A single-row table of the present fields.
    pub fn table(&self) -> Table {
        let columns: Vec<&str> = self.entries.iter().map(|(name, _)| *name).collect();
        let record: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, v)| (name.to_string(), v.clone()))
            .collect();
        Table::project(&columns, &[Value::Object(record)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn journey_query_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let query = JourneyQuery::new().source("ndls").destination("bct").date(date);
        assert_eq!(query.source.as_deref(), Some("ndls"));
        assert_eq!(query.destination.as_deref(), Some("bct"));
        assert_eq!(query.date, Some(date));
        assert_eq!(JourneyQuery::new(), JourneyQuery::default());
    }

    #[test]
    fn train_summary_from_record() {
        let record = json!({
            "trainNumber": "12951",
            "trainName": "MUMBAI RAJDHANI",
            "fromStnCode": "BCT",
            "toStnCode": "NDLS",
            "departureTime": "17:00",
            "arrivalTime": "08:32",
            "avlClasses": ["1A", "2A", "3A"],
            "unknownField": 1
        });
        let train: TrainSummary = serde_json::from_value(record).unwrap();
        assert_eq!(train.train_number, "12951");
        assert_eq!(train.avl_classes, vec!["1A", "2A", "3A"]);
        assert!(train.duration.is_none());
    }

    #[test]
    fn availability_day_status() {
        let day: AvailabilityDay = serde_json::from_value(json!({
            "availablityDate": "15-3-2024",
            "availablityStatus": "AVAILABLE-0042"
        }))
        .unwrap();
        assert!(day.is_available());

        let day: AvailabilityDay =
            serde_json::from_value(json!({"availablityStatus": "GNWL12/WL5"})).unwrap();
        assert!(!day.is_available());
    }

    #[test]
    fn fare_keeps_declared_fields_in_order() {
        let body = json!({
            "totalFare": 2865,
            "errorMessage": null,
            "baseFare": 2400,
            "trainName": "RAJDHANI",
            "goodsServiceTax": 130
        });
        let fare = FareBreakdown::from_response(&body);
        let names: Vec<&str> = fare.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["baseFare", "goodsServiceTax", "totalFare"]);
        assert_eq!(fare.total_fare(), Some(2865.0));
        assert!(fare.get("trainName").is_none());
    }

    #[test]
    fn fare_total_from_string() {
        let fare = FareBreakdown::from_response(&json!({"totalFare": " 455 "}));
        assert_eq!(fare.total_fare(), Some(455.0));
    }

    #[test]
    fn fare_table_has_one_row() {
        let fare = FareBreakdown::from_response(&json!({"baseFare": 400, "totalFare": 455}));
        let table = fare.table();
        assert_eq!(table.columns(), ["baseFare", "totalFare"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "totalFare"), Some(&json!(455)));
    }
}
