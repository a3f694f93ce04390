//! Drives one submission from request to terminal state

use super::client::RemovalService;
use super::exchange::ServiceExchange;
use super::sse::ServiceEvent;
use crate::error::Result;
use crate::services::{StatusReporter, StatusUpdate, SubmissionStage};
use crate::session::EditorSession;
use instant::Instant;
use tracing::{info_span, Instrument};

/// Cancels the submission if the future driving it is dropped early
struct SubmissionGuard<'a> {
    session: &'a mut EditorSession,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.session.cancel_submission() {
            tracing::debug!("submission dropped before reaching a terminal state");
        }
    }
}

/// Submit the session's image and mask, feeding every event back into it
///
/// Returns `Completed` or `Failed`. Service-side failures are not errors
/// of this function: they end up as the session's visible error. Only a
/// refused submission (nothing to submit, already in flight) returns `Err`.
/// Dropping the returned future mid-exchange cancels the submission and
/// returns the session to `Edit`.
pub async fn submit<S>(
    session: &mut EditorSession,
    service: &S,
    reporter: &dyn StatusReporter,
) -> Result<SubmissionStage>
where
    S: RemovalService + ?Sized,
{
    let request = session.begin_submission()?;
    let mut guard = SubmissionGuard { session };
    let session = &mut *guard.session;
    let started = Instant::now();
    reporter.report_status(StatusUpdate::new(SubmissionStage::Uploading, started));

    async {
        let stream = match service.open(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                let message = e.user_message();
                session.apply_service_event(ServiceEvent::Error(message.clone()));
                reporter.report_error(SubmissionStage::Uploading, &message);
                return Ok(SubmissionStage::Failed);
            },
        };

        let mut exchange = ServiceExchange::new(stream);
        let mut outcome = SubmissionStage::Failed;
        while let Some(event) = exchange.next_event().await {
            let message = match &event {
                ServiceEvent::Error(message) => Some(message.clone()),
                ServiceEvent::Mask(_) | ServiceEvent::Image(_) => None,
            };
            let Some(stage) = session.apply_service_event(event) else {
                break;
            };
            match stage {
                SubmissionStage::Completed => {
                    reporter.report_completion(started.elapsed().as_millis() as u64);
                },
                SubmissionStage::Failed => {
                    let message = message
                        .or_else(|| session.error().map(str::to_string))
                        .unwrap_or_default();
                    reporter.report_error(SubmissionStage::Failed, &message);
                },
                SubmissionStage::Uploading | SubmissionStage::MaskReceived => {
                    reporter.report_status(StatusUpdate::new(stage, started));
                },
            }
            if stage.is_terminal() {
                outcome = stage;
                break;
            }
        }
        exchange.close();
        Ok(outcome)
    }
    .instrument(info_span!("exchange"))
    .await
}
