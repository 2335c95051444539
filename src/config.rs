use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::query::GENRE_OPTIONS;
use crate::engine::{DEFAULT_MODEL, DEFAULT_TOP_K};

/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
/// Default listen address for the daemon
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2"). Part of the
    /// artifact identity: changing it requires `reel build`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Number of recommendations returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Optional relevance floor; ranked results scoring below it are
    /// dropped. Disabled when unset.
    #[serde(default)]
    pub score_floor: Option<f32>,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Daemon listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Curated genre list offered by the options endpoint and the wizard.
    #[serde(default = "default_genres")]
    pub genres: Vec<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            top_k: default_top_k(),
            score_floor: None,
            download_timeout_secs: default_download_timeout_secs(),
            listen_addr: default_listen_addr(),
            genres: default_genres(),
            base_path: String::new(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_genres() -> Vec<String> {
    GENRE_OPTIONS.iter().map(|genre| genre.to_string()).collect()
}

impl Config {
    fn validate(&self) {
        if self.top_k == 0 {
            panic!("top_k must be greater than 0");
        }

        if let Some(floor) = self.score_floor {
            if !(-1.0..=1.0).contains(&floor) {
                panic!("score_floor must be between -1.0 and 1.0, got {}", floor);
            }
        }

        if self.download_timeout_secs == 0 {
            panic!("download_timeout_secs must be greater than 0");
        }

        if self.genres.is_empty() {
            panic!("genres must not be empty");
        }
    }

    /// Resolve the data directory: `REEL_DATA_DIR` if set, otherwise
    /// `~/.local/share/reel`.
    pub fn base_path() -> String {
        std::env::var("REEL_DATA_DIR").unwrap_or_else(|_| {
            let home = homedir::my_home()
                .expect("Could not determine home directory")
                .expect("Home directory path is empty");
            format!("{}/.local/share/reel", home.to_string_lossy())
        })
    }

    pub fn load() -> Self {
        Self::load_with(&Self::base_path())
    }

    pub fn load_with(base_path: &str) -> Self {
        std::fs::create_dir_all(base_path).expect("could not create data directory");

        let config_path = PathBuf::from(base_path).join("config.yaml");

        // create new if does not exist
        if !config_path.exists() {
            let yaml = serde_yml::to_string(&Self::default()).expect("default config serializes");
            std::fs::write(&config_path, yaml).expect("could not write default config");
        }

        let config_str =
            std::fs::read_to_string(&config_path).expect("config file is not valid utf8");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_string();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).expect("config serializes") {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_path = self.data_dir().join("config.yaml");
        let temp_path = self.data_dir().join("config.yaml.tmp");

        let yaml = serde_yml::to_string(&self).expect("config serializes");
        std::fs::write(&temp_path, yaml).expect("could not stage config");
        std::fs::rename(&temp_path, &config_path).expect("could not publish config");
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.base_path)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::default()
    }
}
