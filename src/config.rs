use clap::Parser;
use clap::error::ErrorKind;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// MIME type of the Word document produced by the document endpoint.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the OCR backend
    #[arg(long, env = "OCR_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit; bounds the size of an uploaded file.
    pub max_upload_bytes: usize,
    pub static_dir: String,
    pub cors_enabled: bool,
}

/// Where the OCR backend lives and which routes it serves.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub extract_path: String,
    pub document_path: String,
    pub health_path: String,
    /// Unset means requests wait for the backend indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    pub file_name: String,
    pub content_type: String,
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            extract_path: "/extract".to_string(),
            document_path: "/extract-docx".to_string(),
            health_path: "/".to_string(),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => config::ConfigError::Message(e.to_string()),
        })?;

        let backend = BackendConfig::default();
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("server.static_dir", "static")?
            .set_default("server.cors_enabled", false)?
            .set_default("backend.base_url", backend.base_url)?
            .set_default("backend.extract_path", backend.extract_path)?
            .set_default("backend.document_path", backend.document_path)?
            .set_default("backend.health_path", backend.health_path)?
            .set_default("session.ttl_secs", 30 * 60)?
            .set_default("session.sweep_interval_secs", 60)?
            .set_default("download.file_name", "extracted_text.docx")?
            .set_default("download.content_type", DOCX_CONTENT_TYPE)?
            .set_default("download.ttl_secs", 120)?
            .set_default("logging.format", "text")?
            .set_default("logging.filter", "info")?;

        // Explicit file must exist; the cwd fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(Path::new(path)).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
        }

        // E.g. OCRUI_SERVER__PORT=8080, OCRUI_BACKEND__BASE_URL=http://ocr:8000
        builder = builder.add_source(
            Environment::with_prefix("OCRUI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > OCRUI_ env > config file > defaults.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.to_lowercase())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        url::Url::parse(&self.backend.base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "backend.base_url '{}' is not a valid URL: {e}",
                self.backend.base_url
            ))
        })?;
        if self.download.file_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "download.file_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        let backend = BackendConfig::default();
        assert_eq!(backend.base_url, "http://localhost:8000");
        assert_eq!(backend.extract_path, "/extract");
        assert_eq!(backend.document_path, "/extract-docx");
        assert!(backend.timeout_secs.is_none());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = AppConfig::load_from_args([
            "axum-htmx-ocr",
            "--port",
            "4100",
            "--backend-url",
            "http://ocr.internal:9000",
            "--log-format",
            "JSON",
        ])
        .expect("config should load");

        assert_eq!(config.server.port, 4100);
        assert_eq!(config.backend.base_url, "http://ocr.internal:9000");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.bind_address(), format!("{}:4100", config.server.host));
    }

    #[test]
    fn test_invalid_backend_url_rejected() {
        let err = AppConfig::load_from_args(["axum-htmx-ocr", "--backend-url", "not a url"])
            .expect_err("invalid URL must fail");
        assert!(err.to_string().contains("backend.base_url"));
    }
}
