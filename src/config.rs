use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::processor::DEFAULT_BATCH_SIZE;
use crate::semantic::DEFAULT_TOP_K;

/// Environment variable holding the bearer credential for both external services.
pub const API_KEY_ENV: &str = "JINA_API_KEY";
/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "MOVIEMATCH_CONFIG";
/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "moviematch.yaml";

const DEFAULT_READER_URL: &str = "https://r.jina.ai/";
const DEFAULT_EMBEDDINGS_URL: &str = "https://api.jina.ai/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "jina-embeddings-v3";
/// Service-side input limit of the embedding endpoint, in characters
const DEFAULT_MAX_INPUT_CHARS: usize = 15_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JINA_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_yml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Content extraction endpoint (Jina Reader compatible)
    #[serde(default = "default_reader_url")]
    pub reader_url: String,

    /// Embedding endpoint (OpenAI/Jina compatible `/v1/embeddings`)
    #[serde(default = "default_embeddings_url")]
    pub embeddings_url: String,

    /// Model name sent with every embedding request; also keys the cache
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of results returned per search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Directory holding `movies.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding `processed_movies.json`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional proxy for outbound requests (http, https or socks5 url)
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(skip_serializing, skip_deserializing)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reader_url: default_reader_url(),
            embeddings_url: default_embeddings_url(),
            embedding_model: default_embedding_model(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            batch_size: DEFAULT_BATCH_SIZE,
            top_k: DEFAULT_TOP_K,
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            proxy: None,
            listen: default_listen(),
            api_key: None,
        }
    }
}

fn default_reader_url() -> String {
    DEFAULT_READER_URL.to_string()
}

fn default_embeddings_url() -> String {
    DEFAULT_EMBEDDINGS_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Config {
    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            self.batch_size = 1
        }

        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be greater than 0".into()));
        }

        if self.max_input_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_input_chars must be greater than 0".into(),
            ));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::Invalid("embedding_model is empty".into()));
        }

        for (key, value) in [
            ("reader_url", &self.reader_url),
            ("embeddings_url", &self.embeddings_url),
        ] {
            url::Url::parse(value)
                .map_err(|err| ConfigError::Invalid(format!("{key} {value:?}: {err}")))?;
        }

        Ok(())
    }

    /// Load config from `path`, or from `$MOVIEMATCH_CONFIG`, or from
    /// `moviematch.yaml` in the working directory. A missing file means defaults.
    /// The credential always comes from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&config_str).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(config_str: &str) -> Result<Self, serde_yml::Error> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(config_str)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join("movies.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join("processed_movies.json")
    }
}
