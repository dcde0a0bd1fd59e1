use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Proxy};
use std::time::Duration;

use crate::{
    config::HttpOptions,
    error::{ForecastError, Result},
};

use super::{Transport, TransportResponse, truncate_body};

/// `reqwest`-backed transport for `https://<host>/`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(host: &str, options: &HttpOptions) -> Result<Self> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(proxy) = &options.proxy {
            let proxy = Proxy::all(proxy).map_err(|e| {
                ForecastError::InvalidTransportOption(format!("proxy '{proxy}': {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &options.user_agent {
            builder = builder.user_agent(agent.as_str());
        }

        Ok(Self {
            base_url: base_url(host),
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/")
    } else {
        format!("https://{host}/")
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<TransportResponse> {
        let url = format!("{}{}", self.base_url, path);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let headers = res
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = res.text().await?;
        debug!("forecast response: status {status}, {} bytes", body.len());

        if !status.is_success() {
            warn!("forecast request failed with status {status}");
            return Err(ForecastError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = serde_json::from_str(&body)?;

        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
