//! Image I/O operations service
//!
//! Decoding of user-supplied bytes, export encoding, data URL transport and
//! artifact writing live here so the session never touches the filesystem.

use crate::{
    config::OutputFormat,
    error::{EditorError, Result},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// An encoded export ready to be downloaded or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Deterministic file name, e.g. `result.png`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Service for handling image input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// # Examples
    /// ```rust,no_run
    /// use masked_bgremove::services::ImageIOService;
    ///
    /// let bytes = ImageIOService::read_file("input.jpg")?;
    /// let image = ImageIOService::load_from_bytes(&bytes)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();
        std::fs::read(path_ref).map_err(|e| EditorError::file_io_error("read image file", path_ref, &e))
    }

    /// Decode raw image bytes of any supported raster format
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(EditorError::decode("empty image data"));
        }
        image::load_from_memory(bytes)
            .map_err(|e| EditorError::decode(format!("Failed to decode image from bytes: {}", e)))
    }

    /// Encode an image in the given export format
    pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format.image_format())
            .map_err(|e| EditorError::encode(format!("Failed to encode as {}: {}", format, e)))?;
        Ok(buffer.into_inner())
    }

    /// Wrap already-encoded image bytes in a `data:` URL
    ///
    /// The MIME type is sniffed from the bytes themselves.
    pub fn bytes_to_data_url(bytes: &[u8]) -> Result<String> {
        let format = image::guess_format(bytes)
            .map_err(|e| EditorError::encode(format!("Unrecognised image data: {}", e)))?;
        Ok(format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            STANDARD.encode(bytes)
        ))
    }

    /// Encode an image as PNG and wrap it in a `data:` URL
    pub fn png_data_url(image: &DynamicImage) -> Result<String> {
        let bytes = Self::encode(image, OutputFormat::Png)?;
        Ok(format!("data:{};base64,{}", ImageFormat::Png.to_mime_type(), STANDARD.encode(bytes)))
    }

    /// Decode the payload of a `data:` URL into its raw bytes
    ///
    /// Accepts JSON-quoted payloads (`"data:..."`) and bare base64.
    pub fn data_url_to_bytes(payload: &str) -> Result<Vec<u8>> {
        let trimmed = payload.trim();
        let unquoted: String = if trimmed.starts_with('"') {
            serde_json::from_str(trimmed)
                .map_err(|e| EditorError::decode(format!("Malformed quoted payload: {}", e)))?
        } else {
            trimmed.to_string()
        };

        let encoded = match unquoted.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| EditorError::decode("data URL without payload"))?;
                if !header.ends_with(";base64") {
                    return Err(EditorError::decode(format!(
                        "unsupported data URL encoding: {}",
                        header
                    )));
                }
                data.to_string()
            },
            None => unquoted,
        };

        STANDARD
            .decode(encoded.trim())
            .map_err(|e| EditorError::decode(format!("Invalid base64 payload: {}", e)))
    }

    /// Decode a `data:` URL straight into an image
    pub fn load_data_url(payload: &str) -> Result<DynamicImage> {
        let bytes = Self::data_url_to_bytes(payload)?;
        Self::load_from_bytes(&bytes)
    }

    /// Write an artifact into `dir`, creating the directory when needed
    pub fn write_artifact<P: AsRef<Path>>(dir: P, artifact: &ExportArtifact) -> Result<PathBuf> {
        let dir_ref = dir.as_ref();
        std::fs::create_dir_all(dir_ref)
            .map_err(|e| EditorError::file_io_error("create output directory", dir_ref, &e))?;

        let path = dir_ref.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)
            .map_err(|e| EditorError::file_io_error("write export", &path, &e))?;
        log::debug!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path)
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif" | "bmp"
                )
            })
    }
}
