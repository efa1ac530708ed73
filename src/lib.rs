pub mod aggregator;
pub mod api_client;
pub mod api_response;
pub mod config;
pub mod dashboard;
pub mod demo_source;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod http_client;
pub mod odds;
pub mod provider;
pub mod source;
pub mod state;
pub mod statistics;
pub mod teams;
