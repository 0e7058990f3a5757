use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Port the log-streaming server listens on for WebSocket clients.
pub const DEFAULT_WS_PORT: u16 = 8001;

/// Endpoint used when neither the config file nor the CLI names one.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8001";

#[derive(Parser, Debug)]
#[clap(name = "logstream-client", version, about)]
pub struct Cli {
    /// Path to configuration file (optional)
    #[clap(long, default_value = "./config.toml")]
    pub config: PathBuf,

    /// Override WebSocket endpoint URL
    #[clap(long)]
    pub endpoint: Option<String>,

    /// Admin password; prompted on stdin when omitted
    #[clap(long)]
    pub password: Option<String>,

    /// Print log entries as JSON lines
    #[clap(long)]
    pub json: bool,

    /// Prefix log entries with the local receive time
    #[clap(long)]
    pub timestamps: bool,

    /// Disable colored output
    #[clap(long)]
    pub no_color: bool,

    /// Diagnostic log level (error, warn, info, debug, trace)
    #[clap(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub json: bool,
    pub timestamps: bool,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            json: false,
            timestamps: false,
            color: true,
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        let config_content = fs::read_to_string(&cli.config)
            .with_context(|| format!("Failed to read config file: {:?}", cli.config))?;

        toml::from_str(&config_content).context("Failed to parse config file")?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint = endpoint.clone();
    }

    if cli.json {
        config.json = true;
    }

    if cli.timestamps {
        config.timestamps = true;
    }

    if cli.no_color {
        config.color = false;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["logstream-client"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn default_endpoint_uses_default_port() {
        assert!(DEFAULT_ENDPOINT.ends_with(&format!(":{DEFAULT_WS_PORT}")));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(&cli(&["--config", path.to_str().unwrap()])).unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.color);
        assert!(!config.json);
    }

    #[test]
    fn config_file_values_are_read_and_cli_overrides_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"ws://10.0.0.5:9000\"\ntimestamps = true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load_config(&cli(&["--config", &path])).unwrap();
        assert_eq!(config.endpoint, "ws://10.0.0.5:9000");
        assert!(config.timestamps);

        let config = load_config(&cli(&[
            "--config",
            &path,
            "--endpoint",
            "ws://127.0.0.1:7000",
            "--no-color",
            "--json",
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "ws://127.0.0.1:7000");
        assert!(!config.color);
        assert!(config.json);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = [").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(load_config(&cli(&["--config", &path])).is_err());
    }
}
