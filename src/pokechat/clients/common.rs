//! Shared HTTP plumbing for the model clients.
//!
//! A single process-wide `reqwest::Client` is kept so that connections to
//! the model endpoint are pooled and TLS handshakes are reused across
//! requests. Per-request timeouts are applied at call sites via
//! `RequestBuilder::timeout`, so one shared client serves every
//! configuration.

use lazy_static::lazy_static;
use std::time::Duration;

lazy_static! {
    static ref SHARED_HTTP_CLIENT: reqwest::Client = reqwest::Client::builder()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .expect("Failed to build HTTP client");
}

/// Get the process-wide pooled HTTP client.
pub fn get_shared_http_client() -> &'static reqwest::Client {
    &SHARED_HTTP_CLIENT
}
