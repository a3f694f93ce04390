//! Replayable stroke scripts
//!
//! A script is a JSON list of actions in display coordinates relative to a
//! surface. Replay goes through the same pointer API a GUI host drives, so
//! a scripted stroke is indistinguishable from a drawn one.
//!
//! ```json
//! [
//!   {"action": "stroke", "points": [{"x": 10, "y": 10}, {"x": 90, "y": 10}, {"x": 50, "y": 80}]},
//!   {"action": "select_mode", "mode": "remove"},
//!   {"action": "stroke", "mode": "include", "points": [{"x": 0, "y": 0}, {"x": 5, "y": 0}, {"x": 5, "y": 5}]},
//!   {"action": "delete", "at": {"x": 50, "y": 30}},
//!   {"action": "undo"}
//! ]
//! ```

use crate::capture::PointerButton;
use crate::error::{EditorError, Result};
use crate::geometry::Point;
use crate::session::{EditorSession, SurfaceId};
use crate::surface::EditMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Press at the first point, move through the rest, release
    Stroke {
        /// Mode for this stroke only (result surface)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<EditMode>,
        points: Vec<Point>,
    },
    /// Secondary click
    Delete { at: Point },
    Undo,
    Clear,
    SelectMode { mode: EditMode },
}

/// Ordered list of actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeScript {
    pub actions: Vec<ScriptAction>,
}

/// Counters describing what a replay did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub committed: usize,
    pub discarded: usize,
    pub deleted: usize,
    pub undone: usize,
}

impl StrokeScript {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EditorError::invalid_config(format!("Invalid stroke script: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let json = std::fs::read_to_string(path_ref)
            .map_err(|e| EditorError::file_io_error("read stroke script", path_ref, &e))?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Replay every action against one surface of the session
    pub fn replay(&self, session: &mut EditorSession, surface: SurfaceId) -> ReplaySummary {
        let origin = session.surface_origin(surface);
        let to_viewport = |p: Point| Point::new(p.x + origin.x, p.y + origin.y);
        let mut summary = ReplaySummary::default();

        for action in &self.actions {
            match action {
                ScriptAction::Stroke { mode, points } => {
                    let Some((first, rest)) = points.split_first() else {
                        summary.discarded += 1;
                        continue;
                    };
                    let selected = session.edit_mode();
                    if let Some(mode) = mode {
                        session.set_edit_mode(*mode);
                    }
                    let started =
                        session.pointer_down(surface, PointerButton::Primary, to_viewport(*first));
                    session.set_edit_mode(selected);
                    if !started {
                        summary.discarded += 1;
                        continue;
                    }
                    for point in rest {
                        session.pointer_move(to_viewport(*point));
                    }
                    if session.pointer_up().is_some() {
                        summary.committed += 1;
                    } else {
                        summary.discarded += 1;
                    }
                },
                ScriptAction::Delete { at } => {
                    if session.context_click(surface, to_viewport(*at)) {
                        summary.deleted += 1;
                    }
                },
                ScriptAction::Undo => {
                    let undone = match surface {
                        SurfaceId::Mask => session.undo_mask(),
                        SurfaceId::Result => session.undo_edit().is_some(),
                    };
                    if undone {
                        summary.undone += 1;
                    }
                },
                ScriptAction::Clear => match surface {
                    SurfaceId::Mask => session.clear_mask(),
                    SurfaceId::Result => session.clear_edits(),
                },
                ScriptAction::SelectMode { mode } => session.set_edit_mode(*mode),
            }
        }

        tracing::debug!(
            actions = self.actions.len(),
            committed = summary.committed,
            deleted = summary.deleted,
            undone = summary.undone,
            "stroke script replayed"
        );
        summary
    }
}
