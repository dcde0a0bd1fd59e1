use log::{debug, info};

use crate::{
    config::Config,
    error::{ForecastError, Result},
    model::ForecastRequest,
    normalize::{normalize, normalize_currently},
    result::{ForecastResult, assemble},
    transport::{HttpTransport, Transport},
};

/// Passthrough switches for a forecast call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Attach the raw payload under `json`.
    pub add_json: bool,
    /// Attach the allow-listed response headers.
    pub add_headers: bool,
}

/// Fetches and normalizes forecasts. One request per call, no retries.
#[derive(Debug)]
pub struct ForecastClient {
    config: Config,
    transport: Box<dyn Transport>,
}

impl ForecastClient {
    /// Client talking HTTP to the configured host.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.api_host(), &config.http)?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    pub fn with_transport(config: Config, transport: Box<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Forecast for the request's location and time.
    ///
    /// The API key is looked up on every call. A non-2xx status is returned
    /// as an error before any normalization happens.
    pub async fn get_forecast_for(
        &self,
        request: &ForecastRequest,
        options: FetchOptions,
    ) -> Result<ForecastResult> {
        let api_key = self.config.api_key().ok_or(ForecastError::MissingApiKey)?;
        let parts = request.build(&api_key);
        debug!("GET {} {:?}", parts.redacted_path(&api_key), parts.query);

        let response = self.transport.get(&parts.path, &parts.query).await?;
        debug!("status {}, {} headers", response.status, response.headers.len());

        let blocks = normalize(&response.body)?;
        let currently = normalize_currently(&response.body)?;
        info!(
            "forecast for {},{}: {} blocks{}",
            request.latitude,
            request.longitude,
            blocks.len(),
            if currently.is_some() { " + currently" } else { "" },
        );

        let headers = options.add_headers.then_some(response.headers.as_slice());
        let raw_json = options.add_json.then(|| response.body.clone());

        Ok(assemble(blocks, currently, raw_json, headers))
    }

    /// Current forecast, i.e. a request without a timestamp.
    pub async fn get_current_forecast(
        &self,
        request: &ForecastRequest,
        options: FetchOptions,
    ) -> Result<ForecastResult> {
        let mut request = request.clone();
        request.timestamp = None;
        self.get_forecast_for(&request, options).await
    }
}
