use std::env;

use actix_web::cookie::Key;

use crate::errors::AppError;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub session_key: Vec<u8>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("API_URL is not set".into()))?
            .trim_end_matches('/')
            .to_owned();

        let session_key = lookup("SESSION_KEY")
            .ok_or_else(|| AppError::ConfigError("SESSION_KEY is not set".into()))?
            .into_bytes();
        // Key::from panics below 64 bytes
        if session_key.len() < 64 {
            return Err(AppError::ConfigError(
                "SESSION_KEY must be at least 64 bytes".into(),
            ));
        }

        let port = match lookup("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| AppError::ConfigError(format!("invalid PORT {p:?}: {e}")))?,
            None => 8080,
        };

        Ok(Config {
            api_url,
            api_token: lookup("API_TOKEN").filter(|t| !t.is_empty()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://rent_admin.db".to_owned()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            session_key,
            admin_email: lookup("ADMIN_EMAIL"),
            admin_password: lookup("ADMIN_PASSWORD"),
        })
    }

    pub fn cookie_key(&self) -> Key {
        Key::from(&self.session_key)
    }
}
