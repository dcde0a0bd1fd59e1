//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credential lookup
//! - Request building for the `forecast` endpoint
//! - Normalization of forecast payloads into tables
//! - The tagged result type and its formatter
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod normalize;
pub mod request;
pub mod result;
pub mod table;
pub mod transport;

pub use client::{FetchOptions, ForecastClient};
pub use config::{Config, HttpOptions};
pub use display::render;
pub use error::{ForecastError, Result};
pub use model::{BlockName, ForecastRequest, ForecastTime, Units};
pub use normalize::{TIME_FIELDS, normalize, normalize_currently};
pub use request::RequestParts;
pub use result::{ForecastResult, HEADER_ALLOW_LIST, ResultKind, assemble};
pub use table::{Cell, Table, TableBuilder};
pub use transport::{HttpTransport, Transport, TransportResponse};
