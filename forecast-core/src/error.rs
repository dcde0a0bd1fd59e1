use thiserror::Error;

/// Errors surfaced by a forecast call.
///
/// Missing blocks and columns are never errors; only transport failures and a
/// payload that is not a JSON object end up here.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(
        "No API key configured.\n\
         Hint: set DARKSKY_API_KEY or run `forecast configure` and enter your API key."
    )]
    MissingApiKey,

    #[error("Forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse forecast JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build forecast table: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("Malformed forecast payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid transport option: {0}")]
    InvalidTransportOption(String),
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
