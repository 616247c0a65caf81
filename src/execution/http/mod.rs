//! HTTP Utilities
//!
//! - Transport abstraction
//! - Default `reqwest` client

pub mod client;
pub mod transport;

pub use client::ReqwestTransport;
pub use transport::{HttpTransport, HttpTransportRequest, HttpTransportResponse, TransportError};
