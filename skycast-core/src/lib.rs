//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration for locating the weather gateway
//! - A typed HTTP client for the gateway's JSON endpoints
//! - Response models for current conditions and forecasts
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::GatewayClient;
pub use config::{Config, DEFAULT_BASE_URL, ENV_API_BASE};
pub use error::{GatewayError, Result};
pub use model::{CurrentWeather, Forecast};
