//! HTTP capability gateway for Parley.
//!
//! Implements [`parley_chat::CapabilityGateway`] on top of public web APIs.

pub mod http;
pub mod payload;

pub use http::HttpGateway;
