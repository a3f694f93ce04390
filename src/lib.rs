#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Masked Background Removal
//!
//! Lasso mask editing and polygon-clipped compositing for a background
//! removal workflow. A user outlines the subject with freehand strokes, the
//! selection is rasterized at full image resolution and sent to a removal
//! service, and the returned result is refined with "always keep" and
//! "always remove" strokes before export.
//!
//! ## Features
//!
//! - **Lasso capture**: pointer-driven polygon capture shared by the mask and edit surfaces
//! - **Resolution independence**: strokes are captured at display size and rasterized at natural size
//! - **Hit-test deletion**: secondary click removes the topmost polygon under the pointer
//! - **Interleaved undo**: one chronological history across the include and remove lists
//! - **Compositing**: include patches of the original, remove cut-outs, remove always wins
//! - **Service boundary**: SSE exchange with the removal service behind the `RemovalService` trait
//! - **CLI Integration**: optional headless front end (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use masked_bgremove::{
//!     submit, EditorSession, HttpRemovalService, NoOpStatusReporter, Point, PointerButton,
//!     SurfaceId,
//! };
//!
//! # async fn example(photo: Vec<u8>) -> anyhow::Result<()> {
//! let mut session = EditorSession::default();
//! session.load_image(&photo)?;
//!
//! // Outline the subject on the mask surface
//! session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(20.0, 20.0));
//! session.pointer_move(Point::new(200.0, 30.0));
//! session.pointer_move(Point::new(180.0, 240.0));
//! session.pointer_up();
//!
//! let service = HttpRemovalService::from_config(session.config())?;
//! submit(&mut session, &service, &NoOpStatusReporter).await?;
//!
//! if let Some(artifact) = session.export_image()? {
//!     std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface and tracing subscriber setup
//! - `webp-support` (default): WebP export
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! masked-bgremove = { version = "0.1", default-features = false }
//! ```

pub mod capture;
#[cfg(feature = "cli")]
pub mod cli;
pub mod composite;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod overlay;
pub mod raster;
pub mod scaling;
pub mod script;
pub mod service;
pub mod services;
pub mod session;
pub mod surface;
#[cfg(feature = "cli")]
pub mod tracing_config;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use capture::{LassoCapture, PointerButton};
pub use composite::EditLayers;
pub use config::{EditorConfig, EditorConfigBuilder, OutputFormat};
pub use error::{EditorError, Result};
pub use geometry::{CommittedPolygon, Point, Polygon, PolygonId, PolygonList};
pub use history::{EditHistory, HistoryEntry};
pub use overlay::OverlayStyle;
pub use scaling::{RasterTarget, ScaleModel};
pub use script::{ReplaySummary, ScriptAction, StrokeScript};
pub use service::{
    submit, ByteStream, ExchangeState, HttpRemovalService, RemovalService, ServiceEvent,
    ServiceExchange, SseDecoder, SseEvent, SubmissionRequest,
};
pub use services::{
    ConsoleStatusReporter, ExportArtifact, ImageIOService, NoOpStatusReporter,
    OutputFormatHandler, StatusReporter, StatusUpdate, SubmissionStage,
};
pub use session::{EditorSession, SessionPhase, SurfaceId};
pub use surface::{Deletion, EditMode, LassoSurface, Selection, SurfaceCategory};

#[cfg(feature = "cli")]
pub use tracing_config::{events, init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Start an editing session from encoded image bytes
///
/// # Examples
///
/// ```rust,no_run
/// use masked_bgremove::{session_from_bytes, EditorConfig, SessionPhase};
///
/// # fn example(upload_bytes: &[u8]) -> anyhow::Result<()> {
/// let session = session_from_bytes(upload_bytes, EditorConfig::default())?;
/// assert_eq!(session.phase(), SessionPhase::Edit);
/// # Ok(())
/// # }
/// ```
pub fn session_from_bytes(image_bytes: &[u8], config: EditorConfig) -> Result<EditorSession> {
    let mut session = EditorSession::new(config)?;
    session.load_image(image_bytes)?;
    Ok(session)
}

/// Start an editing session from an async reader
///
/// ```rust,no_run
/// use masked_bgremove::{session_from_reader, EditorConfig};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let file = File::open("photo.jpg").await?;
/// let session = session_from_reader(file, EditorConfig::default()).await?;
/// println!("display size: {:?}", session.scale().display_size());
/// # Ok(())
/// # }
/// ```
pub async fn session_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    config: EditorConfig,
) -> Result<EditorSession> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;
    session_from_bytes(&buffer, config)
}
