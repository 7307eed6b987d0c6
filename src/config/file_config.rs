use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub logging_level: Option<String>,

    // Feature configs
    pub spotify: Option<SpotifyFileConfig>,
    pub line: Option<LineFileConfig>,
    pub storage: Option<StorageFileConfig>,
    pub analysis: Option<AnalysisFileConfig>,
    pub delivery: Option<DeliveryFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SpotifyFileConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub request_timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LineFileConfig {
    pub access_token: Option<String>,
    pub request_timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StorageFileConfig {
    pub upload_url: Option<String>,
    /// Base URL the uploaded files are served from. Defaults to the
    /// upload URL.
    pub public_url: Option<String>,
    pub request_timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AnalysisFileConfig {
    pub release_page_size: Option<usize>,
    pub fetch_concurrency: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DeliveryFileConfig {
    /// `link` uploads a CSV and pushes a download link, `text` pushes the
    /// table as a message.
    pub mode: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
