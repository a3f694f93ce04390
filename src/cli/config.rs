//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat};
use crate::config::{EditorConfig, OutputFormat};
use anyhow::{Context, Result};
use std::path::Path;

/// Convert CLI arguments to an `EditorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Start from `--config` (or defaults) and apply flag overrides
    pub(crate) fn from_cli(cli: &Cli) -> Result<EditorConfig> {
        let mut config = match &cli.config {
            Some(path) => Self::load_file(path)?,
            None => EditorConfig::default(),
        };

        if let Some(url) = &cli.service_url {
            config.service_url.clone_from(url);
        }
        if let Some(width) = cli.max_display_width {
            config.max_display_width = width;
        }
        if let Some(secs) = cli.timeout {
            config.request_timeout_secs = secs;
        }
        if let Some(format) = cli.format {
            config.export_format = Self::output_format(format);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<EditorConfig> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub(crate) fn output_format(format: CliOutputFormat) -> OutputFormat {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
            CliOutputFormat::Webp => OutputFormat::WebP,
        }
    }
}
