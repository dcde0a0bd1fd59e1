use std::{borrow::Cow, convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Format the forecast endpoint expects for a point in time.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Unit system requested from the API.
///
/// Values outside the known set are carried verbatim in `Other`; the API is
/// the one that rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Units {
    #[default]
    Us,
    Si,
    Ca,
    Uk,
    Auto,
    Other(String),
}

impl Units {
    pub fn as_str(&self) -> &str {
        match self {
            Units::Us => "us",
            Units::Si => "si",
            Units::Ca => "ca",
            Units::Uk => "uk",
            Units::Auto => "auto",
            Units::Other(value) => value.as_str(),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "us" => Units::Us,
            "si" => Units::Si,
            "ca" => Units::Ca,
            "uk" => Units::Uk,
            "auto" => Units::Auto,
            other => Units::Other(other.to_string()),
        })
    }
}

/// Time a forecast is requested for.
///
/// Strings are assumed to already be in the API's format and are passed through
/// unchanged. Structured values are rendered without an offset: the API then
/// reads them as local time at the requested coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastTime {
    Formatted(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl ForecastTime {
    /// Request string for this time, `YYYY-MM-DDTHH:MM:SS` for structured values.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            ForecastTime::Formatted(s) => Cow::Borrowed(s.as_str()),
            ForecastTime::DateTime(dt) => Cow::Owned(dt.format(TIME_FORMAT).to_string()),
            ForecastTime::Date(d) => {
                Cow::Owned(d.and_time(NaiveTime::MIN).format(TIME_FORMAT).to_string())
            }
        }
    }
}

impl fmt::Display for ForecastTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for ForecastTime {
    fn from(value: &str) -> Self {
        ForecastTime::Formatted(value.to_string())
    }
}

impl From<String> for ForecastTime {
    fn from(value: String) -> Self {
        ForecastTime::Formatted(value)
    }
}

impl From<NaiveDateTime> for ForecastTime {
    fn from(value: NaiveDateTime) -> Self {
        ForecastTime::DateTime(value)
    }
}

impl From<NaiveDate> for ForecastTime {
    fn from(value: NaiveDate) -> Self {
        ForecastTime::Date(value)
    }
}

/// Keeps the wall-clock reading and drops the offset.
impl<Tz: TimeZone> From<DateTime<Tz>> for ForecastTime {
    fn from(value: DateTime<Tz>) -> Self {
        ForecastTime::DateTime(value.naive_local())
    }
}

/// Everything needed to ask for one forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Decimal degrees, used verbatim in the path.
    pub latitude: String,
    /// Decimal degrees, used verbatim in the path.
    pub longitude: String,
    /// `None` asks for the current forecast.
    pub timestamp: Option<ForecastTime>,
    pub units: Units,
    pub language: String,
    /// Comma-joined block names, passed through unchanged.
    pub exclude: Option<String>,
    /// Ask for 168 hours of hourly data instead of 48.
    pub extend_hourly: bool,
}

impl ForecastRequest {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            timestamp: None,
            units: Units::default(),
            language: "en".to_string(),
            exclude: None,
            extend_hourly: false,
        }
    }

    pub fn at(mut self, timestamp: impl Into<ForecastTime>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn extend_hourly(mut self, extend: bool) -> Self {
        self.extend_hourly = extend;
        self
    }
}

/// Blocks that end up as tables, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockName {
    Minutely,
    Hourly,
    Daily,
    Currently,
}

impl BlockName {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockName::Minutely => "minutely",
            BlockName::Hourly => "hourly",
            BlockName::Daily => "daily",
            BlockName::Currently => "currently",
        }
    }

    /// Blocks whose payload is a `data` array of rows.
    pub const fn row_blocks() -> &'static [BlockName] {
        &[BlockName::Minutely, BlockName::Hourly, BlockName::Daily]
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
