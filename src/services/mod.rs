//! Service layer for I/O, export formats and status reporting
//!
//! These services keep file and codec handling out of the editing engine.

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputFormatHandler;
pub use io::{ExportArtifact, ImageIOService};
pub use progress::{
    ConsoleStatusReporter, NoOpStatusReporter, StatusReporter, StatusUpdate, SubmissionStage,
    LOADING_FALLBACK_STATUS,
};
