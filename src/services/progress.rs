//! Submission status reporting service
//!
//! Separates the status text a host shows during a background-removal
//! exchange from the exchange itself, so the CLI spinner, logs and a GUI
//! label can all follow the same stages.

use instant::Instant;

/// Label shown while loading when no specific status has been set
pub const LOADING_FALLBACK_STATUS: &str = "Removing background…";

/// Stages of one background-removal submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    /// Image and mask are being sent
    Uploading,
    /// Refined mask arrived, waiting for the result
    MaskReceived,
    /// Result image arrived
    Completed,
    /// The exchange ended with an error
    Failed,
}

impl SubmissionStage {
    /// Status text for the stage; empty once the exchange is over
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SubmissionStage::Uploading => "Uploading…",
            SubmissionStage::MaskReceived => "Mask received, generating result…",
            SubmissionStage::Completed | SubmissionStage::Failed => "",
        }
    }

    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            SubmissionStage::Uploading => 10,
            SubmissionStage::MaskReceived => 60,
            SubmissionStage::Completed | SubmissionStage::Failed => 100,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStage::Completed | SubmissionStage::Failed)
    }
}

/// Status update with stage and timing information
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub stage: SubmissionStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    pub description: String,
    /// Elapsed time since the submission started (milliseconds)
    pub elapsed_ms: u64,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(stage: SubmissionStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting submission status
pub trait StatusReporter: Send + Sync {
    /// Report a stage change
    fn report_status(&self, update: StatusUpdate);

    /// Report completion with the total exchange time
    fn report_completion(&self, elapsed_ms: u64);

    /// Report an error that ended the exchange
    fn report_error(&self, stage: SubmissionStage, error: &str);
}

/// Reporter that discards all updates
pub struct NoOpStatusReporter;

impl StatusReporter for NoOpStatusReporter {
    fn report_status(&self, _update: StatusUpdate) {}

    fn report_completion(&self, _elapsed_ms: u64) {}

    fn report_error(&self, _stage: SubmissionStage, _error: &str) {}
}

/// Reporter that logs status through `log`
pub struct ConsoleStatusReporter {
    verbose: bool,
}

impl ConsoleStatusReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl StatusReporter for ConsoleStatusReporter {
    fn report_status(&self, update: StatusUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, elapsed_ms: u64) {
        log::info!("✅ Background removal completed in {}ms", elapsed_ms);
    }

    fn report_error(&self, stage: SubmissionStage, error: &str) {
        log::error!("❌ Error during {:?}: {}", stage, error);
    }
}
