//! Explorer configuration.
//!
//! Defaults point at the public PokeAPI. Environment variables override the
//! defaults and command-line flags override both.

use url::Url;

use crate::state::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const ENV_API_URL: &str = "POKEDEX_API_URL";
pub const ENV_PAGE_SIZE: &str = "POKEDEX_PAGE_SIZE";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid page size {0:?}: expected a positive integer")]
    InvalidPageSize(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub api_base: Url,
    pub page_size: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API URL is valid"),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ExplorerConfig {
    /// Variables:
    /// - `POKEDEX_API_URL` (default: `https://pokeapi.co/api/v2`)
    /// - `POKEDEX_PAGE_SIZE` (default: 20)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::default().with_overrides(lookup(ENV_API_URL), lookup(ENV_PAGE_SIZE))
    }

    /// Applies explicitly provided values on top of `self`.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        page_size: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = api_url {
            self.api_base = parse_url(&value)?;
        }
        if let Some(value) = page_size {
            self.page_size = parse_page_size(&value)?;
        }
        Ok(self)
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_page_size(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidPageSize(value.to_string())),
    }
}
