//! Editing session: the single owner of all editor state
//!
//! A session moves through `Upload → Edit ⇄ Loading → Result` and holds the
//! loaded image, both capture surfaces, the refined mask and the result.
//! Hosts drive it with pointer events and service events; every derived
//! raster (mask, previews, exports) is recomputed from committed state on
//! request.

use crate::capture::PointerButton;
use crate::composite::{self, EditLayers};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::geometry::{Point, PolygonId};
use crate::overlay;
use crate::raster;
use crate::scaling::ScaleModel;
use crate::service::{ServiceEvent, SubmissionRequest};
use crate::services::{
    ExportArtifact, ImageIOService, OutputFormatHandler, SubmissionStage, LOADING_FALLBACK_STATUS,
};
use crate::surface::{EditMode, LassoSurface, Selection};
use image::{DynamicImage, GrayImage, RgbaImage};
use tracing::{debug, info, warn};

/// Error shown when a submission is abandoned before it finished
pub const SUBMISSION_CANCELLED: &str = "Submission cancelled";

/// Top-level screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No image loaded
    Upload,
    /// Drawing the selection mask
    Edit,
    /// Waiting for the removal service
    Loading,
    /// Refining the returned result
    Result,
}

/// The two capture surfaces a host can route pointer events to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceId {
    /// Selection drawing over the original image (`Edit` phase)
    Mask,
    /// Include/remove editing over the result (`Result` phase)
    Result,
}

impl SurfaceId {
    fn index(self) -> usize {
        match self {
            Self::Mask => 0,
            Self::Result => 1,
        }
    }
}

#[derive(Debug, Clone)]
struct SourceImage {
    bytes: Vec<u8>,
    pixels: RgbaImage,
}

/// Complete editor state
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    phase: SessionPhase,
    scale: ScaleModel,
    source: Option<SourceImage>,
    mask_surface: LassoSurface<Selection>,
    edit_surface: LassoSurface<EditMode>,
    edit_mode: EditMode,
    refined_mask: Option<GrayImage>,
    result: Option<RgbaImage>,
    in_flight: bool,
    status: String,
    error: Option<String>,
    original_opacity: f32,
    origins: [Point; 2],
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create a session after validating `config`
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: EditorConfig) -> Self {
        Self {
            scale: ScaleModel::empty(config.max_display_width),
            config,
            phase: SessionPhase::Upload,
            source: None,
            mask_surface: LassoSurface::new(),
            edit_surface: LassoSurface::new(),
            edit_mode: EditMode::default(),
            refined_mask: None,
            result: None,
            in_flight: false,
            status: String::new(),
            error: None,
            original_opacity: 0.0,
            origins: [Point::new(0.0, 0.0); 2],
        }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn scale(&self) -> &ScaleModel {
        &self.scale
    }

    #[must_use]
    pub fn mask_surface(&self) -> &LassoSurface<Selection> {
        &self.mask_surface
    }

    #[must_use]
    pub fn edit_surface(&self) -> &LassoSurface<EditMode> {
        &self.edit_surface
    }

    #[must_use]
    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Visible error message, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Status label for the loading screen
    #[must_use]
    pub fn status_text(&self) -> &str {
        if self.phase == SessionPhase::Loading && self.status.is_empty() {
            LOADING_FALLBACK_STATUS
        } else {
            &self.status
        }
    }

    #[must_use]
    pub fn original_image(&self) -> Option<&RgbaImage> {
        self.source.as_ref().map(|source| &source.pixels)
    }

    #[must_use]
    pub fn refined_mask(&self) -> Option<&GrayImage> {
        self.refined_mask.as_ref()
    }

    #[must_use]
    pub fn result_image(&self) -> Option<&RgbaImage> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn original_opacity(&self) -> f32 {
        self.original_opacity
    }

    /// Opacity of the original shown under the result preview, clamped to `[0, 1]`
    pub fn set_original_opacity(&mut self, opacity: f32) {
        self.original_opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    #[must_use]
    pub fn surface_origin(&self, surface: SurfaceId) -> Point {
        self.origins[surface.index()]
    }

    /// Viewport position of a surface's top-left corner
    pub fn set_surface_origin(&mut self, surface: SurfaceId, origin: Point) {
        self.origins[surface.index()] = origin;
    }

    // ---- lifecycle ------------------------------------------------------

    /// Decode and load a new source image
    ///
    /// On failure nothing changes: the session stays on whatever screen it
    /// was on. While a submission is in flight loading is refused.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        if self.in_flight {
            return Err(EditorError::invalid_state(
                "cannot load an image while a submission is in flight",
            ));
        }
        let decoded = ImageIOService::load_from_bytes(bytes)?;
        let pixels = decoded.to_rgba8();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(EditorError::decode("image has no pixels"));
        }

        self.clear_editing_state();
        self.scale.set_natural_size(width, height);
        self.source = Some(SourceImage {
            bytes: bytes.to_vec(),
            pixels,
        });
        self.phase = SessionPhase::Edit;
        info!(
            width,
            height,
            scale = self.scale.scale(),
            "source image loaded"
        );
        Ok(())
    }

    /// Drop everything and return to the upload screen
    pub fn reset(&mut self) {
        self.clear_editing_state();
        self.source = None;
        self.scale.set_natural_size(0, 0);
        self.in_flight = false;
        self.phase = SessionPhase::Upload;
        info!("session reset");
    }

    fn clear_editing_state(&mut self) {
        self.mask_surface.clear();
        self.edit_surface.clear();
        self.refined_mask = None;
        self.result = None;
        self.error = None;
        self.status.clear();
    }

    // ---- pointer routing ------------------------------------------------

    fn surface_accepts_input(&self, surface: SurfaceId) -> bool {
        match surface {
            SurfaceId::Mask => matches!(self.phase, SessionPhase::Edit | SessionPhase::Loading),
            SurfaceId::Result => self.phase == SessionPhase::Result && self.result.is_some(),
        }
    }

    fn to_display(&self, surface: SurfaceId, viewport: Point) -> Point {
        let origin = self.origins[surface.index()];
        self.scale
            .clamp(Point::new(viewport.x - origin.x, viewport.y - origin.y))
    }

    /// Press on a surface: primary starts a stroke, secondary deletes
    pub fn pointer_down(&mut self, surface: SurfaceId, button: PointerButton, viewport: Point) -> bool {
        match button {
            PointerButton::Primary => {
                if !self.surface_accepts_input(surface) {
                    return false;
                }
                let point = self.to_display(surface, viewport);
                match surface {
                    SurfaceId::Mask => self.mask_surface.press(button, point, Selection::Selected),
                    SurfaceId::Result => self.edit_surface.press(button, point, self.edit_mode),
                }
            },
            PointerButton::Secondary => self.context_click(surface, viewport),
            PointerButton::Auxiliary => false,
        }
    }

    /// Viewport-wide move; extends every stroke in progress
    pub fn pointer_move(&mut self, viewport: Point) -> bool {
        let mut extended = false;
        if self.mask_surface.is_drawing() {
            let point = self.to_display(SurfaceId::Mask, viewport);
            extended |= self.mask_surface.extend(point);
        }
        if self.edit_surface.is_drawing() {
            let point = self.to_display(SurfaceId::Result, viewport);
            extended |= self.edit_surface.extend(point);
        }
        extended
    }

    /// Viewport-wide release; commits or discards every stroke in progress
    pub fn pointer_up(&mut self) -> Option<(SurfaceId, PolygonId)> {
        let mut committed = None;
        if self.mask_surface.is_drawing() {
            committed = self
                .mask_surface
                .release()
                .map(|id| (SurfaceId::Mask, id));
        }
        if self.edit_surface.is_drawing() {
            committed = self
                .edit_surface
                .release()
                .map(|id| (SurfaceId::Result, id))
                .or(committed);
        }
        committed
    }

    /// Number of surfaces currently holding a viewport-level capture
    #[must_use]
    pub fn viewport_listeners(&self) -> usize {
        usize::from(self.mask_surface.is_drawing()) + usize::from(self.edit_surface.is_drawing())
    }

    /// Delete the topmost polygon under the pointer; misses are silent
    pub fn context_click(&mut self, surface: SurfaceId, viewport: Point) -> bool {
        if !self.surface_accepts_input(surface) {
            return false;
        }
        let point = self.to_display(surface, viewport);
        match surface {
            SurfaceId::Mask => self.mask_surface.delete_at(point).is_some(),
            SurfaceId::Result => self.edit_surface.delete_at(point).is_some(),
        }
    }

    // ---- editing commands -----------------------------------------------

    /// Remove the most recent selection polygon
    pub fn undo_mask(&mut self) -> bool {
        self.mask_surface.undo_last().is_some()
    }

    pub fn clear_mask(&mut self) {
        self.mask_surface.clear();
    }

    /// Mode for strokes started from now on; a stroke in progress keeps its mode
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    /// Undo the most recent include or remove commit
    pub fn undo_edit(&mut self) -> Option<EditMode> {
        self.edit_surface.undo_last()
    }

    pub fn clear_edits(&mut self) {
        self.edit_surface.clear();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ---- service exchange -----------------------------------------------

    /// Whether a submission could start right now
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight && self.source.is_some() && !self.mask_surface.is_empty()
    }

    /// Build the request for a new submission and enter `Loading`
    ///
    /// The request is encoded before any state changes, so a failure here
    /// leaves the session untouched.
    pub fn begin_submission(&mut self) -> Result<SubmissionRequest> {
        if self.in_flight {
            return Err(EditorError::invalid_state("a submission is already in flight"));
        }
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| EditorError::invalid_state("no image loaded"))?;
        let mask = self
            .mask_raster()
            .ok_or_else(|| EditorError::invalid_state("draw a selection before submitting"))?;

        let request = SubmissionRequest {
            image: ImageIOService::bytes_to_data_url(&source.bytes)?,
            mask: ImageIOService::png_data_url(&DynamicImage::ImageLuma8(mask))?,
        };

        self.phase = SessionPhase::Loading;
        self.in_flight = true;
        self.error = None;
        self.refined_mask = None;
        self.result = None;
        self.edit_surface.clear();
        self.status = SubmissionStage::Uploading.description().to_string();
        info!(
            polygons = self.mask_surface.polygon_count(),
            "submission started"
        );
        Ok(request)
    }

    /// Apply one event of the in-flight exchange
    ///
    /// Returns the stage the session moved to, or `None` when the event was
    /// ignored because nothing is in flight.
    pub fn apply_service_event(&mut self, event: ServiceEvent) -> Option<SubmissionStage> {
        if !self.in_flight {
            debug!(event = event.name(), "service event ignored, nothing in flight");
            return None;
        }
        let stage = match event {
            ServiceEvent::Mask(payload) => match ImageIOService::load_data_url(&payload) {
                Ok(mask) => {
                    self.refined_mask = Some(mask.to_luma8());
                    self.status = SubmissionStage::MaskReceived.description().to_string();
                    debug!("refined mask received");
                    SubmissionStage::MaskReceived
                },
                Err(e) => self.fail_submission(format!("Invalid mask from service: {}", e)),
            },
            ServiceEvent::Image(payload) => match ImageIOService::load_data_url(&payload) {
                Ok(image) => {
                    self.result = Some(image.to_rgba8());
                    self.status.clear();
                    self.in_flight = false;
                    self.phase = SessionPhase::Result;
                    info!("result received");
                    SubmissionStage::Completed
                },
                Err(e) => self.fail_submission(format!("Invalid result from service: {}", e)),
            },
            ServiceEvent::Error(message) => self.fail_submission(message),
        };
        Some(stage)
    }

    /// Abandon the in-flight submission and return to `Edit`
    ///
    /// Returns false when nothing was in flight.
    pub fn cancel_submission(&mut self) -> bool {
        if !self.in_flight {
            return false;
        }
        self.fail_submission(SUBMISSION_CANCELLED.to_string());
        true
    }

    /// End the in-flight submission with a visible error; polygons survive
    fn fail_submission(&mut self, message: String) -> SubmissionStage {
        warn!(error = %message, "submission failed");
        self.error = Some(message);
        self.status.clear();
        self.in_flight = false;
        self.phase = SessionPhase::Edit;
        SubmissionStage::Failed
    }

    /// Enter `Result` with a previously computed result and refined mask
    ///
    /// Used to resume editing offline. Decoding happens before any state
    /// changes.
    pub fn restore_result(&mut self, result: &[u8], refined_mask: Option<&[u8]>) -> Result<()> {
        if self.in_flight {
            return Err(EditorError::invalid_state("a submission is already in flight"));
        }
        if self.source.is_none() {
            return Err(EditorError::invalid_state("no image loaded"));
        }
        let result = ImageIOService::load_from_bytes(result)?.to_rgba8();
        let refined_mask = refined_mask
            .map(|bytes| ImageIOService::load_from_bytes(bytes).map(|mask| mask.to_luma8()))
            .transpose()?;

        self.edit_surface.clear();
        self.result = Some(result);
        self.refined_mask = refined_mask;
        self.error = None;
        self.status.clear();
        self.phase = SessionPhase::Result;
        info!(
            has_mask = self.refined_mask.is_some(),
            "result restored"
        );
        Ok(())
    }

    // ---- derived rasters ------------------------------------------------

    /// Full-resolution selection mask, absent without a selection
    #[must_use]
    pub fn mask_raster(&self) -> Option<GrayImage> {
        raster::rasterize_mask(
            self.mask_surface.list(Selection::Selected),
            self.scale.natural_target(),
        )
    }

    fn layers(&self) -> EditLayers<'_> {
        EditLayers::new(
            self.edit_surface.list(EditMode::Include),
            self.edit_surface.list(EditMode::Remove),
        )
    }

    /// Display-resolution result with edits, over the faded original when enabled
    #[must_use]
    pub fn preview(&self) -> Option<RgbaImage> {
        let result = self.result.as_ref()?;
        let original = &self.source.as_ref()?.pixels;
        let preview = composite::preview(result, original, self.layers(), &self.scale);
        if self.original_opacity > 0.0 {
            Some(overlay::with_original_underlay(
                &preview,
                original,
                self.original_opacity,
            ))
        } else {
            Some(preview)
        }
    }

    /// Full-resolution composite, absent when no edit polygon exists
    #[must_use]
    pub fn composited_image(&self) -> Option<RgbaImage> {
        let result = self.result.as_ref()?;
        let original = &self.source.as_ref()?.pixels;
        composite::export_image(result, original, self.layers(), &self.scale)
    }

    /// Full-resolution edited mask, absent until a refined mask arrived
    #[must_use]
    pub fn final_mask(&self) -> Option<GrayImage> {
        composite::export_mask(self.refined_mask.as_ref(), self.layers(), &self.scale)
    }

    /// Mask at display size for the preview panel
    ///
    /// While selecting this is the selection mask; on the result screen it
    /// is the edited final mask.
    #[must_use]
    pub fn mask_preview(&self) -> Option<GrayImage> {
        let mask = match self.phase {
            SessionPhase::Upload => None,
            SessionPhase::Edit | SessionPhase::Loading => self.mask_raster(),
            SessionPhase::Result => self.final_mask(),
        }?;
        Some(overlay::mask_preview(&mask, &self.scale))
    }

    /// Highlight layer for the mask-drawing surface
    #[must_use]
    pub fn mask_overlay(&self) -> RgbaImage {
        overlay::mask_overlay(&self.mask_surface, &self.scale)
    }

    /// Highlight layer for the result-editing surface
    #[must_use]
    pub fn edit_overlay(&self) -> RgbaImage {
        overlay::edit_overlay(&self.edit_surface, self.edit_mode, &self.scale)
    }

    // ---- exports --------------------------------------------------------

    /// Encoded result image: the composite when edits exist, else the raw result
    pub fn export_image(&self) -> Result<Option<ExportArtifact>> {
        let Some(result) = self.result.as_ref() else {
            return Ok(None);
        };
        let image = self.composited_image().unwrap_or_else(|| result.clone());
        let format = self.config.export_format;
        let bytes = ImageIOService::encode(&OutputFormatHandler::convert_image(image, format), format)?;
        Ok(Some(ExportArtifact {
            file_name: OutputFormatHandler::file_name(&self.config.result_file_stem, format),
            bytes,
        }))
    }

    /// Encoded selection mask as it would be submitted
    pub fn export_selection(&self) -> Result<Option<ExportArtifact>> {
        let Some(mask) = self.mask_raster() else {
            return Ok(None);
        };
        let format = self.config.export_format;
        let bytes = ImageIOService::encode(&OutputFormatHandler::convert_mask(mask, format), format)?;
        Ok(Some(ExportArtifact {
            file_name: OutputFormatHandler::file_name(&self.config.mask_file_stem, format),
            bytes,
        }))
    }

    /// Encoded final mask, absent until a refined mask arrived
    pub fn export_mask(&self) -> Result<Option<ExportArtifact>> {
        let Some(mask) = self.final_mask() else {
            return Ok(None);
        };
        let format = self.config.export_format;
        let bytes = ImageIOService::encode(&OutputFormatHandler::convert_mask(mask, format), format)?;
        Ok(Some(ExportArtifact {
            file_name: OutputFormatHandler::file_name(&self.config.mask_file_stem, format),
            bytes,
        }))
    }
}
