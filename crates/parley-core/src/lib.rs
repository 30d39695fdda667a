//! Shared configuration and error types for Parley.

pub mod config;
pub mod error;

pub use config::{ChatConfig, GatewayConfig, GeneralConfig, ParleyConfig};
pub use error::{ParleyError, Result};
