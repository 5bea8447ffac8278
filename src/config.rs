// Runtime configuration. Everything comes from the environment (optionally
// seeded from a `.env` file in the working directory); the binaries layer
// their command line flags on top.

use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "whisperer_app.db";
pub const DEFAULT_API_URL: &str = "https://api.api-ninjas.com/v1/quotes";

pub const ENV_DB_PATH: &str = "WHISPERER_DB";
pub const ENV_API_URL: &str = "WHISPERER_API_URL";
pub const ENV_API_KEY: &str = "WHISPERER_API_KEY";
/// Accepted as a fallback so an existing API Ninjas setup keeps working.
pub const ENV_API_KEY_FALLBACK: &str = "API_NINJAS_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub api_url: String,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment, loading `.env`
    /// first if one exists. Variables already set are never overridden.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. Blank
    /// values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Config::default();
        Config {
            db_path: get(ENV_DB_PATH).map(PathBuf::from).unwrap_or(defaults.db_path),
            api_url: get(ENV_API_URL).unwrap_or(defaults.api_url),
            api_key: get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)),
        }
    }

    /// Replace the database path when one was given on the command line.
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }
}
