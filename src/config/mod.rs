mod file_config;

pub use file_config::{
    AnalysisFileConfig, DeliveryFileConfig, FileConfig, LineFileConfig, SpotifyFileConfig,
    StorageFileConfig,
};

use crate::analysis::AnalysisSettings;
use crate::delivery::DeliveryMode;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3009,
            logging_level: RequestsLoggingLevel::Path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub spotify: SpotifySettings,
    pub line: LineSettings,
    pub storage: StorageSettings,
    pub analysis: AnalysisSettings,
    pub delivery_mode: DeliveryMode,
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub request_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct LineSettings {
    pub access_token: String,
    pub request_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub upload_url: String,
    pub public_url: String,
    pub request_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file and
    /// the process environment. TOML overrides CLI; file credentials
    /// override environment variables.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_env(cli, file_config, &|name| std::env::var(name).ok())
    }

    fn resolve_with_env(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let spotify_file = file.spotify.unwrap_or_default();
        let client_id = spotify_file
            .client_id
            .or_else(|| env("SPOTIFY_CLIENT_ID"))
            .unwrap_or_default();
        let client_secret = spotify_file
            .client_secret
            .or_else(|| env("SPOTIFY_CLIENT_SECRET"))
            .unwrap_or_default();
        if client_id.is_empty() || client_secret.is_empty() {
            bail!(
                "Spotify credentials missing: set [spotify] client_id/client_secret \
                 or the SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET environment variables"
            );
        }
        let spotify = SpotifySettings {
            client_id,
            client_secret,
            request_timeout_sec: spotify_file.request_timeout_sec.unwrap_or(30),
        };

        let line_file = file.line.unwrap_or_default();
        let access_token = line_file
            .access_token
            .or_else(|| env("LINE_ACCESS_TOKEN"))
            .unwrap_or_default();
        if access_token.is_empty() {
            bail!(
                "Push credentials missing: set [line] access_token \
                 or the LINE_ACCESS_TOKEN environment variable"
            );
        }
        let line = LineSettings {
            access_token,
            request_timeout_sec: line_file.request_timeout_sec.unwrap_or(10),
        };

        let storage_file = file.storage.unwrap_or_default();
        let upload_url = storage_file
            .upload_url
            .or_else(|| env("STORAGE_UPLOAD_URL"))
            .unwrap_or_default();
        if upload_url.is_empty() {
            bail!(
                "Storage upload URL missing: set [storage] upload_url \
                 or the STORAGE_UPLOAD_URL environment variable"
            );
        }
        let public_url = storage_file
            .public_url
            .or_else(|| env("STORAGE_PUBLIC_URL"))
            .unwrap_or_else(|| upload_url.clone());
        let storage = StorageSettings {
            upload_url,
            public_url,
            request_timeout_sec: storage_file.request_timeout_sec.unwrap_or(60),
        };

        let analysis_file = file.analysis.unwrap_or_default();
        let analysis_defaults = AnalysisSettings::default();
        let analysis = AnalysisSettings {
            release_page_size: analysis_file
                .release_page_size
                .unwrap_or(analysis_defaults.release_page_size),
            fetch_concurrency: analysis_file
                .fetch_concurrency
                .unwrap_or(analysis_defaults.fetch_concurrency),
        };

        let delivery_mode = file
            .delivery
            .unwrap_or_default()
            .mode
            .and_then(|s| parse_delivery_mode(&s))
            .unwrap_or_default();

        Ok(Self {
            port,
            logging_level,
            spotify,
            line,
            storage,
            analysis,
            delivery_mode,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_delivery_mode(s: &str) -> Option<DeliveryMode> {
    DeliveryMode::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn credentials_file() -> FileConfig {
        FileConfig {
            spotify: Some(SpotifyFileConfig {
                client_id: Some("id".to_string()),
                client_secret: Some("secret".to_string()),
                ..Default::default()
            }),
            line: Some(LineFileConfig {
                access_token: Some("token".to_string()),
                ..Default::default()
            }),
            storage: Some(StorageFileConfig {
                upload_url: Some("http://uploads.local".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("body"),
            Some(RequestsLoggingLevel::Body)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        // Invalid
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_defaults() {
        let config =
            AppConfig::resolve_with_env(&CliConfig::default(), Some(credentials_file()), &no_env)
                .unwrap();

        assert_eq!(config.port, 3009);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Path);
        assert_eq!(config.spotify.request_timeout_sec, 30);
        assert_eq!(config.line.request_timeout_sec, 10);
        assert_eq!(config.storage.request_timeout_sec, 60);
        assert_eq!(config.analysis.release_page_size, 50);
        assert_eq!(config.analysis.fetch_concurrency, 8);
        assert_eq!(config.delivery_mode, DeliveryMode::Link);
        // public_url falls back to upload_url
        assert_eq!(config.storage.public_url, "http://uploads.local");
    }

    #[test]
    fn test_resolve_delivery_mode() {
        let mut file = credentials_file();
        file.delivery = Some(DeliveryFileConfig {
            mode: Some("text".to_string()),
        });

        let config = AppConfig::resolve_with_env(&CliConfig::default(), Some(file), &no_env).unwrap();
        assert_eq!(config.delivery_mode, DeliveryMode::Text);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let mut file = credentials_file();
        file.port = Some(4000);
        file.logging_level = Some("body".to_string());
        file.analysis = Some(AnalysisFileConfig {
            release_page_size: Some(20),
            fetch_concurrency: Some(2),
        });

        let cli = CliConfig {
            port: 3001,
            logging_level: RequestsLoggingLevel::Headers,
        };

        let config = AppConfig::resolve_with_env(&cli, Some(file), &no_env).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.analysis.release_page_size, 20);
        assert_eq!(config.analysis.fetch_concurrency, 2);
    }

    #[test]
    fn test_resolve_env_credentials() {
        let env = |name: &str| match name {
            "SPOTIFY_CLIENT_ID" => Some("env-id".to_string()),
            "SPOTIFY_CLIENT_SECRET" => Some("env-secret".to_string()),
            "LINE_ACCESS_TOKEN" => Some("env-token".to_string()),
            "STORAGE_UPLOAD_URL" => Some("http://env-uploads".to_string()),
            "STORAGE_PUBLIC_URL" => Some("https://files.env".to_string()),
            _ => None,
        };

        let config = AppConfig::resolve_with_env(&CliConfig::default(), None, &env).unwrap();

        assert_eq!(config.spotify.client_id, "env-id");
        assert_eq!(config.line.access_token, "env-token");
        assert_eq!(config.storage.upload_url, "http://env-uploads");
        assert_eq!(config.storage.public_url, "https://files.env");
    }

    #[test]
    fn test_file_credentials_override_env() {
        let env = |name: &str| match name {
            "SPOTIFY_CLIENT_ID" => Some("env-id".to_string()),
            _ => None,
        };

        let config =
            AppConfig::resolve_with_env(&CliConfig::default(), Some(credentials_file()), &env)
                .unwrap();
        assert_eq!(config.spotify.client_id, "id");
    }

    #[test]
    fn test_resolve_missing_spotify_credentials_error() {
        let mut file = credentials_file();
        file.spotify = None;

        let result = AppConfig::resolve_with_env(&CliConfig::default(), Some(file), &no_env);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Spotify credentials missing"));
    }

    #[test]
    fn test_resolve_missing_push_token_error() {
        let mut file = credentials_file();
        file.line = None;

        let result = AppConfig::resolve_with_env(&CliConfig::default(), Some(file), &no_env);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Push credentials missing"));
    }

    #[test]
    fn test_resolve_missing_upload_url_error() {
        let mut file = credentials_file();
        file.storage = None;

        let result = AppConfig::resolve_with_env(&CliConfig::default(), Some(file), &no_env);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Storage upload URL missing"));
    }

    #[test]
    fn test_load_toml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
                port = 8080

                [spotify]
                client_id = "abc"
                client_secret = "def"

                [analysis]
                fetch_concurrency = 4
            "#
        )
        .unwrap();

        let loaded = FileConfig::load(file.path()).unwrap();
        assert_eq!(loaded.port, Some(8080));
        assert_eq!(loaded.spotify.unwrap().client_id, Some("abc".to_string()));
        assert_eq!(loaded.analysis.unwrap().fetch_concurrency, Some(4));
    }
}
