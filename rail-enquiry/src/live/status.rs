//! Live running status of a train.

use serde_json::{Map, Value};

use crate::table::Table;

use super::error::LiveParseError;
use super::parser::parse_embedded;

/// Per-rake summary table columns.
pub const RAKE_COLUMNS: &[&str] = &[
    "startDate",
    "departed",
    "curStn",
    "terminated",
    "lastUpdated",
    "totalLateMins",
];

/// Per-station table columns within a rake.
pub const STATION_COLUMNS: &[&str] = &[
    "stnCode",
    "arr",
    "schArrTime",
    "actArr",
    "delayArr",
    "dep",
    "schDepTime",
    "actDep",
    "delayDep",
    "dayCnt",
    "schDayCnt",
    "distance",
];

/// Live status: the train's scalar fields plus one entry per running rake.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStatus {
    fields: Map<String, Value>,
    rakes: Vec<Value>,
}

impl LiveStatus {
    /// Parse a raw live status payload.
    ///
    /// The train record is the first object found, either at the top level
    /// or as the first object of a top-level array.
    pub fn parse(payload: &str) -> Result<Self, LiveParseError> {
        let record = match parse_embedded(payload)? {
            Value::Object(map) => map,
            Value::Array(items) => items
                .into_iter()
                .find_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .ok_or(LiveParseError::NoTrainRecord)?,
            _ => return Err(LiveParseError::NoTrainRecord),
        };

        Ok(Self::from_record(record))
    }

    fn from_record(record: Map<String, Value>) -> Self {
        let mut fields = Map::new();
        let mut rakes = Vec::new();

        for (key, value) in record {
            match (key.as_str(), value) {
                ("rakes", Value::Array(items)) => rakes = items,
                (_, Value::Array(_) | Value::Object(_)) => {}
                (_, scalar) => {
                    fields.insert(key, scalar);
                }
            }
        }

        Self { fields, rakes }
    }

    /// Scalar train fields such as `trainNo` or `trainName`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Raw rake records.
    pub fn rakes(&self) -> &[Value] {
        &self.rakes
    }

    /// One row per rake under [`RAKE_COLUMNS`].
    pub fn rakes_table(&self) -> Table {
        Table::project(RAKE_COLUMNS, &self.rakes)
    }

    /// One table per rake of its stations under [`STATION_COLUMNS`].
    pub fn station_tables(&self) -> Vec<Table> {
        self.rakes
            .iter()
            .map(|rake| {
                let stations = rake
                    .get("stations")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                Table::project(STATION_COLUMNS, stations)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYLOAD: &str = r#"
        [{trainNo:"12301",trainName:"HOWRAH RAJDHANI",trainSrc:"HWH",trainDstn:"NDLS",
          runsOn:"DAILY",
          rakes:[
            {startDate:"08-Mar-2024",departed:true,curStn:"CNB",terminated:false,
             lastUpdated:"08-Mar-2024 06:10",totalLateMins:12,
             stations:[
               {stnCode:"HWH",arr:false,dep:true,schDepTime:"16:50",actDep:"16:50",delayDep:0,dayCnt:0,distance:0},
               {stnCode:"CNB",arr:true,schArrTime:"05:55",actArr:"06:07",delayArr:12,dayCnt:1,distance:1000},
             ]},
            {startDate:"09-Mar-2024",departed:false,curStn:"HWH",terminated:false,totalLateMins:0,stations:[]},
          ]}]
    "#;

    #[test]
    fn parses_fields_and_rakes() {
        let status = LiveStatus::parse(PAYLOAD).unwrap();
        assert_eq!(status.field("trainNo"), Some(&json!("12301")));
        assert_eq!(status.field("trainDstn"), Some(&json!("NDLS")));
        assert!(status.field("rakes").is_none());
        assert_eq!(status.rakes().len(), 2);
    }

    #[test]
    fn rakes_table_follows_declared_columns() {
        let status = LiveStatus::parse(PAYLOAD).unwrap();
        let table = status.rakes_table();
        assert_eq!(table.columns(), RAKE_COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "curStn"), Some(&json!("CNB")));
        assert_eq!(table.cell(0, "totalLateMins"), Some(&json!(12)));
        assert_eq!(table.cell(1, "lastUpdated"), Some(&Value::Null));
    }

    #[test]
    fn station_tables_per_rake() {
        let status = LiveStatus::parse(PAYLOAD).unwrap();
        let tables = status.station_tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[0].cell(1, "delayArr"), Some(&json!(12)));
        assert_eq!(tables[0].cell(0, "schArrTime"), Some(&Value::Null));
        assert!(tables[1].is_empty());
    }

    #[test]
    fn object_payload_without_rakes() {
        let status = LiveStatus::parse("{trainNo: '12301', message: 'not running'}").unwrap();
        assert!(status.rakes().is_empty());
        assert_eq!(status.fields().len(), 2);
    }

    #[test]
    fn payload_without_record_is_an_error() {
        assert_eq!(
            LiveStatus::parse("[1, 2, 3]"),
            Err(LiveParseError::NoTrainRecord)
        );
        assert_eq!(
            LiveStatus::parse("<html>maintenance</html>"),
            Err(LiveParseError::NoValue)
        );
    }
}
