//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub model_dir: PathBuf,

    /// LightGBM model dump, relative to `model_dir`
    pub model_file: String,

    /// Scaler parameters, relative to `model_dir`
    pub scaler_file: String,

    /// Environment (development, production)
    pub environment: String,

    /// `json` for machine-readable logs, anything else for human output
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_dir: PathBuf::from("models"),
            model_file: "exonet_lgbm_model.json".to_string(),
            scaler_file: "exonet_scaler.json".to_string(),
            environment: "development".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_dir: lookup("MODEL_DIR").map(PathBuf::from).unwrap_or(defaults.model_dir),

            model_file: lookup("MODEL_FILE").unwrap_or(defaults.model_file),

            scaler_file: lookup("SCALER_FILE").unwrap_or(defaults.scaler_file),

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),

            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(&self.scaler_file)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
