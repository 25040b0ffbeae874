//! Fixed-column projections of JSON records.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Rows of JSON values under a fixed, declared column order.
///
/// A column the record does not carry is `null` in that row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Project records onto `columns`, in that order.
    pub fn project(columns: &[&str], records: &[Value]) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(*c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` in the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Every value of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

/// Plain-text rendering of a cell.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let write_row = |f: &mut fmt::Formatter<'_>, row: &[String]| -> fmt::Result {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(f, "{}", line.trim_end())
        };

        write_row(f, &self.columns)?;
        for row in &cells {
            write_row(f, row)?;
        }
        Ok(())
    }
}

/// A list result: the raw records plus the columns used to tabulate them.
#[derive(Debug, Clone, PartialEq)]
pub struct Records {
    columns: &'static [&'static str],
    items: Vec<Value>,
}

impl Records {
    pub fn new(columns: &'static [&'static str], items: Vec<Value>) -> Self {
        Self { columns, items }
    }

    /// Wrap a JSON array; anything else is `None`.
    pub fn from_value(columns: &'static [&'static str], value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::new(columns, items)),
            _ => None,
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The declared-column projection of the records.
    pub fn table(&self) -> Table {
        Table::project(self.columns, &self.items)
    }

    /// Deserialize every record into a typed view.
    pub fn typed<T: serde::de::DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.items
            .iter()
            .map(|item| serde_json::from_value(item.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["availablityDate", "availablityStatus", "reason"];

    #[test]
    fn projection_follows_declared_order() {
        // Upstream key order is the reverse of the declared one.
        let records: Vec<Value> = serde_json::from_str(
            r#"[{"reason": "", "availablityStatus": "AVAILABLE-0042", "availablityDate": "5-3-2024"}]"#,
        )
        .unwrap();

        let table = Table::project(COLUMNS, &records);
        assert_eq!(table.columns(), ["availablityDate", "availablityStatus", "reason"]);
        assert_eq!(
            table.rows()[0],
            vec![json!("5-3-2024"), json!("AVAILABLE-0042"), json!("")]
        );
    }

    #[test]
    fn missing_columns_are_null_and_extras_dropped() {
        let records = vec![json!({"availablityDate": "5-3-2024", "extra": true})];
        let table = Table::project(COLUMNS, &records);
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.cell(0, "availablityStatus"), Some(&Value::Null));
        assert_eq!(table.cell(0, "extra"), None);
    }

    #[test]
    fn column_access() {
        let records = vec![
            json!({"availablityStatus": "AVAILABLE-0001"}),
            json!({"availablityStatus": "GNWL12/WL5"}),
        ];
        let table = Table::project(COLUMNS, &records);
        assert_eq!(table.len(), 2);
        let statuses = table.column("availablityStatus").unwrap();
        assert_eq!(statuses, vec![&json!("AVAILABLE-0001"), &json!("GNWL12/WL5")]);
        assert!(table.column("nope").is_none());
    }

    #[test]
    fn display_aligns_columns() {
        let records = vec![json!({"availablityDate": "5-3-2024", "availablityStatus": "AVAILABLE-0042"})];
        let table = Table::project(&["availablityDate", "availablityStatus"], &records);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "availablityDate  availablityStatus");
        assert_eq!(lines[1], "5-3-2024         AVAILABLE-0042");
    }

    #[test]
    fn cell_text_flattens_arrays() {
        assert_eq!(cell_text(&json!(["SL", "3A"])), "SL,3A");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!(42)), "42");
    }

    #[test]
    fn records_require_an_array() {
        assert!(Records::from_value(COLUMNS, json!({"a": 1})).is_none());
        let records = Records::from_value(COLUMNS, json!([{"reason": "x"}])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records.table().cell(0, "reason"), Some(&json!("x")));
    }
}
