use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::FetchError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "corner-dashboard/0.1";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client with the default timeout.
pub fn http_client() -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| build_http_client(DEFAULT_TIMEOUT_SECS))
}

/// Client with a custom per-request timeout; the shared one is reused for the
/// default.
pub fn http_client_with_timeout(timeout_secs: u64) -> Result<Client, FetchError> {
    if timeout_secs == DEFAULT_TIMEOUT_SECS {
        return http_client().cloned();
    }
    build_http_client(timeout_secs)
}

fn build_http_client(timeout_secs: u64) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)
}
