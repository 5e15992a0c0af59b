use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    /// Public URL prefix used to make hypermedia links absolute
    pub api_host: String,
    /// When unset the places lookup is disabled and every unknown id is a 404
    pub google_maps_api_key: Option<String>,
    pub stats_cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_host: env::var("API_HOST").context("API_HOST must be set")?,
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            stats_cache_ttl_secs: env::var("STATS_CACHE_TTL")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .context("STATS_CACHE_TTL must be a number of seconds")?,
        })
    }
}
