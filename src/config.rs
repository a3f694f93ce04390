//! Configuration types for the mask editor and its removal service

use crate::error::{EditorError, Result};
use crate::services::OutputFormatHandler;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Default display cap in pixels
pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 540;
/// Default background-removal endpoint
pub const DEFAULT_SERVICE_URL: &str = "https://1417.gpu.mainly.cloud/upload";
/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Export image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
    /// Lossless WebP with alpha (requires the `webp-support` feature)
    WebP,
}

impl OutputFormat {
    #[must_use]
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Tiff => write!(f, "tiff"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

/// Configuration for an editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Widest on-screen rendering in pixels; larger images are scaled down
    pub max_display_width: u32,

    /// Background-removal endpoint receiving the image and mask
    pub service_url: String,

    /// HTTP request timeout in seconds (0 = no timeout)
    pub request_timeout_secs: u64,

    /// Format of exported image and mask
    pub export_format: OutputFormat,

    /// File stem of the exported result image
    pub result_file_stem: String,

    /// File stem of the exported mask
    pub mask_file_stem: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            export_format: OutputFormat::default(),
            result_file_stem: "result".to_string(),
            mask_file_stem: "mask".to_string(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use masked_bgremove::{EditorConfig, OutputFormat};
    ///
    /// let config = EditorConfig::builder()
    ///     .max_display_width(800)
    ///     .export_format(OutputFormat::Tiff)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_display_width, 800);
    /// ```
    #[must_use]
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - `max_display_width` is zero
    /// - empty service URL
    /// - empty export file stems
    /// - an export format this build cannot write
    pub fn validate(&self) -> Result<()> {
        if self.max_display_width == 0 {
            return Err(EditorError::config_value_error(
                "max display width",
                self.max_display_width,
                "1 or more",
                Some(DEFAULT_MAX_DISPLAY_WIDTH),
            ));
        }

        if self.service_url.trim().is_empty() {
            return Err(EditorError::invalid_config("service URL must not be empty"));
        }

        if self.result_file_stem.trim().is_empty() || self.mask_file_stem.trim().is_empty() {
            return Err(EditorError::invalid_config(
                "export file stems must not be empty",
            ));
        }

        OutputFormatHandler::validate_for_export(self.export_format)
    }

    /// Request timeout, `None` when disabled
    #[must_use]
    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        (self.request_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.request_timeout_secs))
    }
}

/// Builder for `EditorConfig`
#[derive(Debug, Default)]
pub struct EditorConfigBuilder {
    config: EditorConfig,
}

impl EditorConfigBuilder {
    #[must_use]
    pub fn max_display_width(mut self, width: u32) -> Self {
        self.config.max_display_width = width;
        self
    }

    #[must_use]
    pub fn service_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.service_url = url.into();
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn export_format(mut self, format: OutputFormat) -> Self {
        self.config.export_format = format;
        self
    }

    #[must_use]
    pub fn result_file_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.config.result_file_stem = stem.into();
        self
    }

    #[must_use]
    pub fn mask_file_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.config.mask_file_stem = stem.into();
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns an error when [`EditorConfig::validate`] rejects the values.
    pub fn build(self) -> Result<EditorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
