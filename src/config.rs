//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use crate::timer::DEFAULT_MATCH_SECONDS;

pub const DEFAULT_PORT: u16 = 5005;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file (from BATTLE_BRACKET_DB). `None` uses the platform data
    /// directory.
    pub db_path: Option<PathBuf>,
    /// Match timer length in seconds (from BATTLE_BRACKET_MATCH_SECONDS)
    pub match_seconds: u64,
    /// Allowed CORS origins (from BATTLE_BRACKET_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin so OBS browser sources can poll freely.
    pub cors_origins: Option<Vec<String>>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let db_path = std::env::var("BATTLE_BRACKET_DB").ok().map(PathBuf::from);

        let match_seconds = std::env::var("BATTLE_BRACKET_MATCH_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MATCH_SECONDS);

        let cors_origins = std::env::var("BATTLE_BRACKET_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path,
            match_seconds,
            cors_origins,
        }
    }

    /// Override the listen address, e.g. from CLI flags.
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Config with no environment lookups (for testing).
    pub fn local() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            db_path: None,
            match_seconds: DEFAULT_MATCH_SECONDS,
            cors_origins: None,
        }
    }

    pub fn with_cors_origins(origins: Vec<String>) -> Self {
        Self {
            cors_origins: Some(origins),
            ..Self::local()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
