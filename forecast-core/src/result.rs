use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

use crate::{model::BlockName, table::Table};

/// Response headers worth keeping next to a forecast.
pub const HEADER_ALLOW_LIST: &[&str] =
    &["cache-control", "expires", "x-forecast-api-calls", "x-response-time"];

/// Key the raw payload is stored under. No block is named like this.
pub const RAW_JSON_KEY: &str = "json";

/// Key the discriminant is serialized under.
pub const KIND_KEY: &str = "kind";

/// Discriminant consumers match on to pick a formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Forecast,
}

/// Normalized forecast plus whatever passthrough was asked for.
#[derive(Debug, Clone)]
pub struct ForecastResult {
    pub kind: ResultKind,
    blocks: Vec<(BlockName, Table)>,
    json: Option<Value>,
    headers: Vec<(String, String)>,
}

impl ForecastResult {
    /// Blocks in reporting order: `minutely`, `hourly`, `daily`, `currently`.
    pub fn blocks(&self) -> &[(BlockName, Table)] {
        &self.blocks
    }

    pub fn block(&self, name: BlockName) -> Option<&Table> {
        self.blocks.iter().find(|(n, _)| *n == name).map(|(_, t)| t)
    }

    pub fn block_names(&self) -> impl Iterator<Item = BlockName> + '_ {
        self.blocks.iter().map(|(n, _)| *n)
    }

    /// The untouched payload, when raw passthrough was requested.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Allow-listed headers that were present, lower-cased.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serialized as one object: `kind`, blocks in order, then `json`, then `headers`.
impl Serialize for ForecastResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(KIND_KEY, &self.kind)?;
        for (name, table) in &self.blocks {
            map.serialize_entry(name.as_str(), table)?;
        }
        if let Some(json) = &self.json {
            map.serialize_entry(RAW_JSON_KEY, json)?;
        }
        if !self.headers.is_empty() {
            let headers: serde_json::Map<String, Value> = self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.serialize_entry("headers", &headers)?;
        }
        map.end()
    }
}

/// Builds the tagged result.
///
/// `currently` always goes last. `headers` is filtered against
/// [`HEADER_ALLOW_LIST`]; names match case-insensitively and absent entries
/// are skipped.
pub fn assemble(
    blocks: Vec<(BlockName, Table)>,
    currently: Option<Table>,
    raw_json: Option<Value>,
    headers: Option<&[(String, String)]>,
) -> ForecastResult {
    let mut ordered: Vec<(BlockName, Table)> = blocks
        .into_iter()
        .filter(|(name, _)| *name != BlockName::Currently)
        .collect();
    ordered.sort_by_key(|(name, _)| *name as u8);
    if let Some(table) = currently {
        ordered.push((BlockName::Currently, table));
    }

    ForecastResult {
        kind: ResultKind::Forecast,
        blocks: ordered,
        json: raw_json,
        headers: headers.map(select_headers).unwrap_or_default(),
    }
}

fn select_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    HEADER_ALLOW_LIST
        .iter()
        .filter_map(|wanted| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| (wanted.to_string(), value.clone()))
        })
        .collect()
}
