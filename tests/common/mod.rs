#![allow(dead_code)]

use outstack_api::lemlist::{LemlistClient, LemlistConfig, build_http_client};
use std::time::Duration;
use wiremock::MockServer;

pub const API_KEY: &str = "key";
/// `Basic base64(":key")`
pub const AUTH_HEADER: &str = "Basic OmtleQ==";

/// Config pointed at `server` with millisecond backoff so retry tests stay fast.
pub fn config_for(server: &MockServer) -> LemlistConfig {
    let mut config = LemlistConfig::with_base_url(server.uri(), Some(API_KEY.to_string()));
    config.retry_delay = Duration::from_millis(5);
    config
}

pub fn client_for(server: &MockServer) -> LemlistClient {
    let config = config_for(server);
    let http = build_http_client(&config).expect("http client");
    LemlistClient::new(http, &config).expect("lemlist client")
}
