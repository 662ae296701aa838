use serde::Deserialize;
use std::fmt;
use std::fs::{self, metadata};
use thiserror::Error;

const SYSTEM_CONFIG_PATH: &str = "/etc/imagegate/configs.yaml";
const LOCAL_CONFIG_PATH: &str = "src/configs/configs.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("OPENAI_API_KEY environment variable is required")]
    MissingApiKey,
}

// ---------------------------------------------- CORS ----------------------------------------------
// "*" in any list means "allow any".
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec!["*".to_string()],
            allow_headers: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 3600,
        }
    }
}

// ---------------------------------------------- Config ----------------------------------------------
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub generation_model: String,
    pub edit_model: String,
    pub request_timeout_secs: u64,
    pub cors: CorsConfig,
    pub server_cert_file: Option<String>,
    pub key_file: Option<String>,
    pub log_config_file: String,
    pub title: String,
    pub description: String,
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 0,
            openai_api_key: "".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            generation_model: "dall-e-3".to_string(),
            edit_model: "dall-e-2".to_string(),
            request_timeout_secs: 120,
            cors: CorsConfig::default(),
            server_cert_file: None,
            key_file: None,
            log_config_file: "src/configs/log4rs.yaml".to_string(),
            title: "Image Generator API".to_string(),
            description: "API Backend for AI image generation and editing".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("workers", &self.workers)
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("generation_model", &self.generation_model)
            .field("edit_model", &self.edit_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors", &self.cors)
            .field("server_cert_file", &self.server_cert_file)
            .field("key_file", &self.key_file)
            .field("log_config_file", &self.log_config_file)
            .finish()
    }
}

impl Config {
    /// Reads the YAML file (if any), applies environment overrides and checks
    /// that the provider credential is present.
    pub fn load() -> Result<Config, ConfigError> {
        let config = match Self::config_path() {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_string(),
                    source,
                })?;
                Self::from_yaml_str(&contents).map_err(|source| ConfigError::Parse {
                    path: path.to_string(),
                    source,
                })?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    fn config_path() -> Option<&'static str> {
        if metadata(SYSTEM_CONFIG_PATH).is_ok() {
            Some(SYSTEM_CONFIG_PATH)
        } else if metadata(LOCAL_CONFIG_PATH).is_ok() {
            Some(LOCAL_CONFIG_PATH)
        } else {
            None
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn apply_env<F>(mut self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = api_key;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = base_url;
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value: port })?;
        }

        self.openai_api_key = self.openai_api_key.trim().to_string();
        if self.openai_api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        self.openai_base_url = self.openai_base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn tls_files(&self) -> Option<(&str, &str)> {
        match (&self.server_cert_file, &self.key_file) {
            (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => {
                Some((cert.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}
