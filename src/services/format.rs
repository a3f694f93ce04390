//! Export format handling service
//!
//! Keeps the pixel-layout decisions for each export format out of the
//! session, so exports and the CLI agree on file names and encodings.

use crate::config::OutputFormat;
use crate::error::{EditorError, Result};
use image::{DynamicImage, GrayImage, RgbaImage};

/// Service for export format conversions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Wrap a composited RGBA result for encoding in `format`
    #[must_use]
    pub fn convert_image(rgba_image: RgbaImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::WebP => {
                DynamicImage::ImageRgba8(rgba_image)
            },
        }
    }

    /// Wrap a mask for encoding in `format`
    ///
    /// PNG and TIFF keep a single gray channel; WebP masks are widened to RGBA.
    #[must_use]
    pub fn convert_mask(mask: GrayImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Png | OutputFormat::Tiff => DynamicImage::ImageLuma8(mask),
            OutputFormat::WebP => DynamicImage::ImageRgba8(DynamicImage::ImageLuma8(mask).to_rgba8()),
        }
    }

    /// File extension (without the dot)
    ///
    /// # Examples
    /// ```rust
    /// use masked_bgremove::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Tiff), "tiff");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
            OutputFormat::WebP => "webp",
        }
    }

    /// Deterministic export file name such as `result.png`
    #[must_use]
    pub fn file_name(stem: &str, format: OutputFormat) -> String {
        format!("{}.{}", stem, Self::get_extension(format))
    }

    #[must_use]
    pub fn mime_type(format: OutputFormat) -> &'static str {
        format.image_format().to_mime_type()
    }

    /// Whether `format` was compiled in
    #[must_use]
    pub fn is_available(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::Tiff => true,
            OutputFormat::WebP => cfg!(feature = "webp-support"),
        }
    }

    /// Reject an export format that cannot be written by this build
    pub fn validate_for_export(format: OutputFormat) -> Result<()> {
        if Self::is_available(format) {
            return Ok(());
        }
        log::warn!(
            "Export format {:?} is not compiled in; enable the `webp-support` feature.",
            format
        );
        Err(EditorError::invalid_config(format!(
            "export format {} is not available in this build",
            format
        )))
    }
}
