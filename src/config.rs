// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Which hunt store implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or its emulator)
    Firestore,
    /// Process-local store; contents are lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,

    // --- Secrets ---
    /// JWT signing key for session tokens and admin credentials (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Shared secret the event platform signs attendee tokens with
    pub platform_token_secret: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            platform_token_secret: b"test_platform_secret_32_bytes!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            platform_token_secret: env::var("PLATFORM_TOKEN_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PLATFORM_TOKEN_SECRET"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("PLATFORM_TOKEN_SECRET", " platform_secret ");
        env::set_var("STORE_BACKEND", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.platform_token_secret, b"platform_secret");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("Firestore".parse::<StoreBackend>().unwrap(), StoreBackend::Firestore);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!(matches!(
            "redis".parse::<StoreBackend>(),
            Err(ConfigError::Invalid("STORE_BACKEND", _))
        ));
    }
}
