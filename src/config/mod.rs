/// Application configuration module
use crate::errors::ConfigError;
use std::env;
use std::time::Duration;

/// Planets per page when `PAGE_SIZE` is not set
pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub images_base_url: String,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub page_size: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let base_url = required("BASE_URL")?;
        let images_base_url = required("IMAGES_BASE_URL")?;

        let user_agent =
            env::var("USER_AGENT").unwrap_or_else(|_| "swapi-planets/1.0".to_string());

        let page_size = env_u64("PAGE_SIZE", PAGE_SIZE as u64);
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "PAGE_SIZE",
                value: page_size.to_string(),
            });
        }

        Ok(Self {
            base_url: with_trailing_slash(base_url),
            images_base_url: with_trailing_slash(images_base_url),
            http_timeout: Duration::from_secs(env_u64("HTTP_TIMEOUT_SECONDS", 30)),
            user_agent,
            page_size: page_size as usize,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Relative paths are joined onto the base, so it must end in a slash
pub fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
