//! Execution layer: everything that performs I/O on behalf of the client.

pub mod http;
