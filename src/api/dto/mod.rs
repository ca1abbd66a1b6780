mod http_api_config;

pub use http_api_config::*;
