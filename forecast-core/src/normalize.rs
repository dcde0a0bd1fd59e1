//! Turns a forecast payload into tables.

use chrono::DateTime;
use log::debug;
use serde_json::{Map, Value};

use crate::{
    error::{ForecastError, Result},
    model::BlockName,
    table::{Cell, Table, TableBuilder},
};

/// Columns holding epoch seconds. Anything else is left as a number.
pub const TIME_FIELDS: &[&str] = &[
    "time",
    "sunriseTime",
    "sunsetTime",
    "temperatureMinTime",
    "temperatureMaxTime",
    "apparentTemperatureMinTime",
    "apparentTemperatureMaxTime",
    "precipIntensityMaxTime",
];

/// `currently` is a single instant, so only its `time` applies.
const CURRENTLY_TIME_FIELDS: &[&str] = &["time"];

/// Tables for the `minutely`, `hourly` and `daily` blocks that are present, in
/// that order. Absent or `null` blocks are left out rather than returned empty.
pub fn normalize(raw: &Value) -> Result<Vec<(BlockName, Table)>> {
    let root = as_object(raw)?;

    let mut blocks = Vec::new();
    for &name in BlockName::row_blocks() {
        let Some(block) = root.get(name.as_str()).filter(|v| !v.is_null()) else {
            continue;
        };
        let table = block_table(block)?;
        debug!("{name}: {} rows x {} columns", table.len(), table.columns().len());
        blocks.push((name, table));
    }

    Ok(blocks)
}

/// Single-row table for `currently`, or `None` unless the block is an object.
pub fn normalize_currently(raw: &Value) -> Result<Option<Table>> {
    let root = as_object(raw)?;

    let Some(record) = root.get(BlockName::Currently.as_str()).and_then(Value::as_object) else {
        return Ok(None);
    };

    let mut builder = TableBuilder::new();
    builder.push(record_cells(record, CURRENTLY_TIME_FIELDS));
    Ok(Some(builder.build()?))
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        ForecastError::MalformedPayload(format!("expected a JSON object, got {}", kind_of(raw)))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rows come from the block's `data` array; non-object entries are skipped.
fn block_table(block: &Value) -> Result<Table> {
    let mut builder = TableBuilder::new();
    let rows = block
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push(record_cells(row, TIME_FIELDS));
    }

    Ok(builder.build()?)
}

/// Cells of one record, with `time_fields` turned into UTC times.
fn record_cells<'a>(
    record: &'a Map<String, Value>,
    time_fields: &'a [&str],
) -> impl Iterator<Item = (&'a str, Cell)> + 'a {
    record.iter().map(move |(key, value)| {
        let cell = json_cell(value);
        let cell = if time_fields.contains(&key.as_str()) {
            epoch_to_time(&cell).unwrap_or(cell)
        } else {
            cell
        };
        (key.as_str(), cell)
    })
}

fn json_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map_or(Cell::Null, Cell::Float),
        },
        Value::String(s) => Cell::Text(s.clone()),
        nested => Cell::Text(nested.to_string()),
    }
}

fn epoch_to_time(cell: &Cell) -> Option<Cell> {
    let secs = match *cell {
        Cell::Int(secs) => secs,
        Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0).map(Cell::Time)
}
