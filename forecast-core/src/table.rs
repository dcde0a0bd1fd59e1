//! Tables with an explicit column set, stored as polars frames.
//!
//! Forecast rows do not share a schema: a `daily` row may carry
//! `precipType` while its neighbour does not. [`TableBuilder`] collects the
//! ordered union of field names across all rows first and only then
//! materializes every row against that fixed column set, filling the gaps with
//! [`Cell::Null`]. Each column then becomes one typed polars series.

use std::{collections::HashMap, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use polars::prelude::{
    AnyValue, Column, DataFrame, DataType, NamedFrom, PolarsResult, Series, TimeUnit,
};
use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

/// Unit of the `Datetime` columns built here. Values are UTC.
pub const TIME_UNIT: TimeUnit = TimeUnit::Milliseconds;

/// One value in a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Time(t) => Some(*t),
            _ => None,
        }
    }

    fn from_any_value(value: AnyValue<'_>) -> Cell {
        match value {
            AnyValue::Null => Cell::Null,
            AnyValue::Boolean(v) => Cell::Bool(v),
            AnyValue::Int64(v) => Cell::Int(v),
            AnyValue::Float64(v) => Cell::Float(v),
            AnyValue::String(v) => Cell::Text(v.to_string()),
            AnyValue::StringOwned(v) => Cell::Text(v.to_string()),
            AnyValue::Datetime(v, unit, _) => {
                let time = match unit {
                    TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                    TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                    TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                };
                time.map_or(Cell::Null, Cell::Time)
            }
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NA"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Bool(v) => serializer.serialize_bool(*v),
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Text(v) => serializer.serialize_str(v),
            Cell::Time(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

/// Column type picked from the cells of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Time,
}

impl ColumnKind {
    fn of(cell: &Cell) -> Self {
        match cell {
            Cell::Null => ColumnKind::Null,
            Cell::Bool(_) => ColumnKind::Bool,
            Cell::Int(_) => ColumnKind::Int,
            Cell::Float(_) => ColumnKind::Float,
            Cell::Text(_) => ColumnKind::Text,
            Cell::Time(_) => ColumnKind::Time,
        }
    }

    /// Ints widen to floats; any other mix falls back to text.
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (kind, ColumnKind::Null) | (ColumnKind::Null, kind) => kind,
            (a, b) if a == b => a,
            (ColumnKind::Int, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Int) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }
}

fn column_series(name: &str, cells: &[Cell]) -> PolarsResult<Series> {
    let kind = cells
        .iter()
        .fold(ColumnKind::Null, |kind, cell| kind.merge(ColumnKind::of(cell)));

    let series = match kind {
        ColumnKind::Null => Series::full_null(name.into(), cells.len(), &DataType::Null),
        ColumnKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Cell::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Cell::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(Cell::as_f64).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Time => {
            let millis: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.as_time().map(|t| t.timestamp_millis()))
                .collect();
            Series::new(name.into(), millis).cast(&DataType::Datetime(TIME_UNIT, None))?
        }
        ColumnKind::Text => {
            let owned: Vec<Option<String>> = cells
                .iter()
                .map(|c| (!c.is_null()).then(|| c.to_string()))
                .collect();
            let values: Vec<Option<&str>> = owned.iter().map(Option::as_deref).collect();
            Series::new(name.into(), values)
        }
    };

    Ok(series)
}

/// Ordered rows sharing one ordered column set.
#[derive(Debug, Clone, Default)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn columns(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Polars type of column `name`.
    pub fn dtype(&self, name: &str) -> Option<&DataType> {
        self.frame.column(name).ok().map(|c| c.dtype())
    }

    /// Cell at `row` in column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<Cell> {
        let column = self.frame.column(name).ok()?;
        let value = column.as_materialized_series().get(row).ok()?;
        Some(Cell::from_any_value(value))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let series = self.frame.column(name).ok()?.as_materialized_series();
        (0..series.len())
            .map(|idx| series.get(idx).ok().map(Cell::from_any_value))
            .collect()
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: usize) -> Option<Vec<Cell>> {
        if row >= self.len() {
            return None;
        }
        self.frame
            .get_columns()
            .iter()
            .map(|c| {
                let value = c.as_materialized_series().get(row).ok()?;
                Some(Cell::from_any_value(value))
            })
            .collect()
    }
}

struct RowRef<'a> {
    columns: &'a [&'a str],
    cells: Vec<Cell>,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.columns.iter().zip(&self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// Serialized as an array of row objects; every row carries every column.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for idx in 0..self.len() {
            let cells = self.row(idx).unwrap_or_default();
            seq.serialize_element(&RowRef {
                columns: &columns,
                cells,
            })?;
        }
        seq.end()
    }
}

/// Outer-join builder: the column set is the union of keys across records,
/// in order of first appearance.
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Vec<(usize, Cell)>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record. A key repeated within the record keeps its last value.
    pub fn push<I, K>(&mut self, record: I)
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: Into<String>,
    {
        let record: Vec<(usize, Cell)> = record
            .into_iter()
            .map(|(key, cell)| (self.column_slot(key.into()), cell))
            .collect();
        self.records.push(record);
    }

    fn column_slot(&mut self, key: String) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(key.clone());
        self.index.insert(key, idx);
        idx
    }

    pub fn build(self) -> PolarsResult<Table> {
        let width = self.columns.len();
        let height = self.records.len();

        let mut grid = vec![vec![Cell::Null; height]; width];
        for (row, record) in self.records.into_iter().enumerate() {
            for (col, cell) in record {
                grid[col][row] = cell;
            }
        }

        let columns = self
            .columns
            .iter()
            .zip(&grid)
            .map(|(name, cells)| column_series(name, cells).map(Column::from))
            .collect::<PolarsResult<Vec<Column>>>()?;

        Ok(Table {
            frame: DataFrame::new(columns)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(secs: i64) -> Cell {
        Cell::Time(DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn sample() -> Table {
        let mut builder = TableBuilder::new();
        builder.push([("time", utc(1)), ("temperature", Cell::Float(50.5))]);
        builder.push([("time", utc(2)), ("summary", Cell::Text("Clear".into()))]);
        builder.push([("time", Cell::Null)]);
        builder.build().unwrap()
    }

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let table = sample();
        assert_eq!(table.columns(), ["time", "temperature", "summary"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn missing_keys_become_null() {
        let table = sample();
        assert_eq!(table.cell(0, "summary"), Some(Cell::Null));
        assert_eq!(table.cell(1, "temperature"), Some(Cell::Null));
        assert!(table.row(2).unwrap().iter().all(Cell::is_null));
        assert!(table.row(3).is_none());
    }

    #[test]
    fn column_types_follow_cells() {
        let table = sample();
        assert_eq!(table.dtype("time"), Some(&DataType::Datetime(TIME_UNIT, None)));
        assert_eq!(table.dtype("temperature"), Some(&DataType::Float64));
        assert_eq!(table.dtype("summary"), Some(&DataType::String));
        assert_eq!(table.column("time").unwrap(), [utc(1), utc(2), Cell::Null]);
    }

    #[test]
    fn ints_and_floats_share_a_float_column() {
        let mut builder = TableBuilder::new();
        builder.push([("temperature", Cell::Int(50))]);
        builder.push([("temperature", Cell::Float(50.5))]);
        let table = builder.build().unwrap();

        assert_eq!(table.dtype("temperature"), Some(&DataType::Float64));
        assert_eq!(
            table.column("temperature").unwrap(),
            [Cell::Float(50.0), Cell::Float(50.5)]
        );
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        let mut builder = TableBuilder::new();
        builder.push([("time", Cell::Text("soon".into()))]);
        builder.push([("time", utc(60))]);
        builder.push([("time", Cell::Null)]);
        let table = builder.build().unwrap();

        assert_eq!(table.dtype("time"), Some(&DataType::String));
        assert_eq!(
            table.column("time").unwrap(),
            [
                Cell::Text("soon".into()),
                Cell::Text("1970-01-01T00:01:00Z".into()),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let mut builder = TableBuilder::new();
        builder.push([("a", Cell::Int(1)), ("a", Cell::Int(2))]);
        let table = builder.build().unwrap();
        assert_eq!(table.columns(), ["a"]);
        assert_eq!(table.cell(0, "a"), Some(Cell::Int(2)));
    }

    #[test]
    fn empty_builder_gives_empty_table() {
        let table = TableBuilder::new().build().unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn serializes_as_row_objects() {
        let mut builder = TableBuilder::new();
        builder.push([("time", utc(0))]);
        builder.push([("icon", Cell::Text("rain".into()))]);
        let value = serde_json::to_value(builder.build().unwrap()).unwrap();

        assert_eq!(
            value,
            json!([
                {"time": "1970-01-01T00:00:00Z", "icon": null},
                {"time": null, "icon": "rain"}
            ])
        );
    }

    #[test]
    fn cell_display() {
        assert_eq!(Cell::Null.to_string(), "NA");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(utc(1_620_000_000).to_string(), "2021-05-03T00:00:00Z");
    }
}
