use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::Result;

pub mod http;

pub use http::HttpTransport;

/// What came back from a successful (2xx) request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Performs one GET against the forecast host.
///
/// Implementations fail with [`crate::ForecastError::Status`] for non-2xx
/// responses and never retry.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<TransportResponse>;
}

/// Cuts long error bodies down for messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_untouched() {
        assert_eq!(truncate_body("forbidden"), "forbidden");
    }

    #[test]
    fn long_body_truncated_on_char_boundary() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
