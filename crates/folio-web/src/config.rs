use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} not set; add it to the environment or .env file")]
    MissingVar { name: &'static str },

    #[error("invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Process configuration, resolved once at startup.
///
/// The completion API key is the only required value; startup fails fast
/// without it rather than deferring the failure to the first request.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingVar {
            name: "OPENAI_API_KEY",
        })?;

        let bind = env::var("FOLIO_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
        let bind_addr = bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            bind_addr,
            openai_api_key,
            openai_model: env::var("FOLIO_OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
            openai_base_url: env::var("FOLIO_OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_owned()),
        })
    }
}
