use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::http::io::{DEFAULT_MAX_HEADER, DEFAULT_MAX_LINE};

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Longest request header line accepted, in bytes.
    pub max_line_length: usize,
    /// Largest request header block accepted, all lines included.
    pub max_header_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.to_string(),
            max_line_length: DEFAULT_MAX_LINE,
            max_header_bytes: DEFAULT_MAX_HEADER,
        }
    }
}

impl Config {
    /// Loads the YAML file named by `GRIDLINE_CONFIG`, if any, then applies
    /// the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("GRIDLINE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.listen_addr = listen_addr;
        }
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
