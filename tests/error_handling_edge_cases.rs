//! Error handling and edge case testing
//!
//! Input errors, degenerate geometry, no-op deletions and configuration
//! boundaries. None of these may panic or leave the session half-updated.

use image::{DynamicImage, Rgba, RgbaImage};
use masked_bgremove::{
    EditMode, EditorConfig, EditorError, EditorSession, ImageIOService, OutputFormat, Point,
    PointerButton, Result, ServiceEvent, SessionPhase, StrokeScript, SurfaceId,
};
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Result<Vec<u8>> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([50, 60, 70, 255])));
    ImageIOService::encode(&image, OutputFormat::Png)
}

#[test]
fn test_config_validation_edge_cases() -> Result<()> {
    let config = EditorConfig::builder().max_display_width(1).build()?;
    assert_eq!(config.max_display_width, 1);

    let error = EditorConfig::builder()
        .max_display_width(0)
        .build()
        .unwrap_err();
    assert!(matches!(error, EditorError::InvalidConfig(_)));
    assert!(error.to_string().contains("max display width"));
    assert!(error.to_string().contains("Recommended: 540"));

    assert!(EditorConfig::builder().service_url("").build().is_err());
    assert!(EditorConfig::builder().result_file_stem("").build().is_err());
    assert!(EditorConfig::builder().mask_file_stem("").build().is_err());

    let config = EditorConfig::builder().request_timeout_secs(0).build()?;
    assert!(config.request_timeout().is_none());
    Ok(())
}

#[test]
fn test_config_from_partial_json() -> Result<()> {
    let config: EditorConfig = serde_json::from_str(r#"{"export_format": "tiff"}"#)
        .map_err(|e| EditorError::invalid_config(e.to_string()))?;
    assert_eq!(config.export_format, OutputFormat::Tiff);
    assert_eq!(config.max_display_width, 540);
    assert_eq!(config.result_file_stem, "result");
    Ok(())
}

#[test]
fn test_invalid_image_bytes_never_enter_edit() {
    let mut session = EditorSession::default();
    let inputs: [&[u8]; 3] = [b"", b"GIF89a", b"\x89PNG\r\n\x1a\n truncated"];
    for bytes in inputs {
        assert!(session.load_image(bytes).is_err());
        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.original_image().is_none());
    }
}

#[test]
fn test_failed_reload_keeps_current_image() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&png(64, 32)?)?;
    assert!(session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(1.0, 1.0)));
    session.pointer_move(Point::new(30.0, 1.0));
    session.pointer_move(Point::new(30.0, 30.0));
    session.pointer_up();

    assert!(session.load_image(b"not an image").is_err());
    assert_eq!(session.phase(), SessionPhase::Edit);
    assert_eq!(session.mask_surface().polygon_count(), 1);
    assert_eq!(session.scale().natural_size(), (64, 32));
    Ok(())
}

#[test]
fn test_noop_deletions_and_undos() -> Result<()> {
    let mut session = EditorSession::default();
    assert!(!session.context_click(SurfaceId::Mask, Point::new(1.0, 1.0)));
    assert!(!session.undo_mask());
    assert_eq!(session.undo_edit(), None);

    session.load_image(&png(20, 20)?)?;
    assert!(!session.context_click(SurfaceId::Mask, Point::new(5.0, 5.0)));
    assert!(!session.context_click(SurfaceId::Result, Point::new(5.0, 5.0)));
    assert!(!session.undo_mask());
    session.clear_mask();
    session.clear_edits();
    assert!(session.error().is_none());
    Ok(())
}

#[test]
fn test_release_without_press_is_ignored() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&png(20, 20)?)?;
    assert!(!session.pointer_move(Point::new(3.0, 3.0)));
    assert!(session.pointer_up().is_none());
    assert_eq!(session.viewport_listeners(), 0);
    Ok(())
}

#[test]
fn test_second_press_during_capture_is_ignored() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&png(50, 50)?)?;
    assert!(session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(1.0, 1.0)));
    assert!(!session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(9.0, 9.0)));
    session.pointer_move(Point::new(20.0, 1.0));
    session.pointer_move(Point::new(20.0, 20.0));
    session.pointer_up();

    let polygon = &session
        .mask_surface()
        .list(masked_bgremove::Selection::Selected)
        .last()
        .expect("committed polygon")
        .polygon;
    assert_eq!(polygon.points()[0], Point::new(1.0, 1.0));
    assert_eq!(polygon.len(), 3);
    Ok(())
}

#[test]
fn test_data_url_edge_cases() -> Result<()> {
    assert!(ImageIOService::data_url_to_bytes("data:image/png,plain").is_err());
    assert!(ImageIOService::data_url_to_bytes("data:image/png;base64,@@@").is_err());
    assert!(ImageIOService::load_data_url("").is_err());

    let url = ImageIOService::png_data_url(&DynamicImage::ImageRgba8(RgbaImage::new(3, 2)))?;
    let quoted = format!("\"{}\"", url);
    assert_eq!(
        ImageIOService::data_url_to_bytes(&quoted)?,
        ImageIOService::data_url_to_bytes(&url)?
    );
    assert_eq!(ImageIOService::load_data_url(&quoted)?.width(), 3);
    Ok(())
}

#[test]
fn test_empty_error_event_reports_connection_error() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&png(20, 20)?)?;
    session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(1.0, 1.0));
    session.pointer_move(Point::new(15.0, 1.0));
    session.pointer_move(Point::new(15.0, 15.0));
    session.pointer_up();
    session.begin_submission()?;

    let raw = masked_bgremove::SseDecoder::new().push(b"event: error\n\n");
    let event = ServiceEvent::from_sse(&raw[0]).expect("error event");
    session.apply_service_event(event);
    assert_eq!(session.error(), Some("Connection error"));
    Ok(())
}

#[test]
fn test_original_opacity_is_sanitized() {
    let mut session = EditorSession::default();
    session.set_original_opacity(f32::NAN);
    assert_eq!(session.original_opacity(), 0.0);
    session.set_original_opacity(-1.0);
    assert_eq!(session.original_opacity(), 0.0);
    session.set_original_opacity(0.4);
    assert!((session.original_opacity() - 0.4).abs() < f32::EPSILON);
}

#[test]
fn test_exports_absent_without_result() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&png(20, 20)?)?;
    assert!(session.export_image()?.is_none());
    assert!(session.export_mask()?.is_none());
    assert!(session.preview().is_none());
    assert!(session.mask_preview().is_none());
    Ok(())
}

#[test]
fn test_artifact_written_into_missing_directory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut session = EditorSession::default();
    session.load_image(&png(20, 20)?)?;
    session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(0.0, 0.0));
    session.pointer_move(Point::new(20.0, 0.0));
    session.pointer_move(Point::new(20.0, 20.0));
    session.pointer_up();

    let artifact = session.export_selection()?.expect("selection");
    let nested = temp_dir.path().join("a").join("b");
    let path = ImageIOService::write_artifact(&nested, &artifact)?;
    assert_eq!(path, nested.join("mask.png"));
    assert!(path.exists());
    Ok(())
}

#[test]
fn test_stroke_script_errors() -> Result<()> {
    assert!(matches!(
        StrokeScript::from_json("{"),
        Err(EditorError::InvalidConfig(_))
    ));
    assert!(matches!(
        StrokeScript::load("/nonexistent/strokes.json"),
        Err(EditorError::Io(_))
    ));
    assert!(StrokeScript::from_json(r#"[{"action": "select_mode", "mode": "erase"}]"#).is_err());

    let script = StrokeScript::from_json(r#"[{"action": "stroke", "points": []}, {"action": "undo"}]"#)?;
    let mut session = EditorSession::default();
    session.load_image(&png(20, 20)?)?;
    let summary = script.replay(&mut session, SurfaceId::Mask);
    assert_eq!(summary.discarded, 1);
    assert_eq!(summary.undone, 0);
    assert_eq!(session.edit_mode(), EditMode::Include);
    Ok(())
}
