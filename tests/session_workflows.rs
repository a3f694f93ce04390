//! Integration tests for editing session workflows
//!
//! These tests drive `EditorSession` through the same pointer and service
//! calls a host application makes, without any network access.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use masked_bgremove::{
    EditMode, EditorConfig, EditorError, EditorSession, ImageIOService, OutputFormat, Point,
    PointerButton, Result, Selection, ServiceEvent, SessionPhase, StrokeScript, SubmissionStage,
    SurfaceId,
};

fn encoded(width: u32, height: u32, pixel: Rgba<u8>) -> Result<Vec<u8>> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel));
    ImageIOService::encode(&image, OutputFormat::Png)
}

fn stroke(session: &mut EditorSession, surface: SurfaceId, points: &[(f64, f64)]) -> bool {
    let Some((first, rest)) = points.split_first() else {
        return false;
    };
    session.pointer_down(surface, PointerButton::Primary, Point::from(*first));
    for p in rest {
        session.pointer_move(Point::from(*p));
    }
    session.pointer_up().is_some()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [(f64, f64); 4] {
    [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
}

/// Session in `Result` with a 100x100 red original and blue result
fn result_session() -> Result<EditorSession> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(100, 100, Rgba([255, 0, 0, 255]))?)?;
    assert!(stroke(&mut session, SurfaceId::Mask, &rect(5.0, 5.0, 95.0, 95.0)));
    session.begin_submission()?;
    let mask = ImageIOService::png_data_url(&DynamicImage::ImageLuma8(GrayImage::from_pixel(
        100,
        100,
        Luma([128]),
    )))?;
    let result = ImageIOService::png_data_url(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        100,
        100,
        Rgba([0, 0, 255, 255]),
    )))?;
    assert_eq!(
        session.apply_service_event(ServiceEvent::Mask(mask)),
        Some(SubmissionStage::MaskReceived)
    );
    assert_eq!(
        session.apply_service_event(ServiceEvent::Image(result)),
        Some(SubmissionStage::Completed)
    );
    Ok(session)
}

#[test]
fn test_capture_commits_only_on_release() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(200, 100, Rgba([0, 0, 0, 255]))?)?;

    assert!(session.pointer_down(SurfaceId::Mask, PointerButton::Primary, Point::new(10.0, 10.0)));
    assert!(session.mask_surface().is_drawing());
    session.pointer_move(Point::new(50.0, 10.0));
    session.pointer_move(Point::new(50.0, 50.0));
    assert!(session.mask_surface().is_empty());
    assert_eq!(
        session.mask_surface().in_progress().map(|(p, _)| p.len()),
        Some(3)
    );

    assert!(session.pointer_up().is_some());
    assert!(!session.mask_surface().is_drawing());
    assert_eq!(session.mask_surface().polygon_count(), 1);
    Ok(())
}

#[test]
fn test_non_primary_press_never_starts_capture() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(100, 100, Rgba([0, 0, 0, 255]))?)?;

    assert!(!session.pointer_down(SurfaceId::Mask, PointerButton::Auxiliary, Point::new(1.0, 1.0)));
    assert!(!session.pointer_down(SurfaceId::Mask, PointerButton::Secondary, Point::new(1.0, 1.0)));
    assert!(!session.mask_surface().is_drawing());
    assert_eq!(session.viewport_listeners(), 0);
    Ok(())
}

#[test]
fn test_degenerate_strokes_are_dropped() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(100, 100, Rgba([0, 0, 0, 255]))?)?;

    assert!(!stroke(&mut session, SurfaceId::Mask, &[(10.0, 10.0)]));
    assert!(!stroke(&mut session, SurfaceId::Mask, &[(10.0, 10.0), (20.0, 20.0)]));
    assert!(session.mask_surface().is_empty());
    assert!(session.mask_surface().history().is_empty());
    assert!(session.mask_raster().is_none());
    Ok(())
}

#[test]
fn test_pointer_moves_outside_surface_are_clamped() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(1000, 500, Rgba([0, 0, 0, 255]))?)?;
    assert_eq!(session.scale().display_size(), (540, 270));

    assert!(stroke(
        &mut session,
        SurfaceId::Mask,
        &[(-20.0, -20.0), (900.0, 10.0), (900.0, 900.0)]
    ));
    let entry = session
        .mask_surface()
        .list(Selection::Selected)
        .last()
        .expect("committed polygon");
    assert_eq!(
        entry.polygon.points(),
        &[
            Point::new(0.0, 0.0),
            Point::new(540.0, 10.0),
            Point::new(540.0, 270.0)
        ]
    );
    Ok(())
}

#[test]
fn test_mask_surface_undo_and_delete() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(100, 100, Rgba([0, 0, 0, 255]))?)?;

    stroke(&mut session, SurfaceId::Mask, &rect(10.0, 10.0, 50.0, 50.0));
    stroke(&mut session, SurfaceId::Mask, &rect(30.0, 30.0, 70.0, 70.0));
    stroke(&mut session, SurfaceId::Mask, &rect(80.0, 80.0, 90.0, 90.0));

    // Overlap: the most recent polygon wins
    assert!(session.context_click(SurfaceId::Mask, Point::new(40.0, 40.0)));
    let remaining: Vec<_> = session
        .mask_surface()
        .list(Selection::Selected)
        .polygons()
        .map(|p| p.points()[0])
        .collect();
    assert_eq!(remaining, vec![Point::new(10.0, 10.0), Point::new(80.0, 80.0)]);

    assert!(!session.context_click(SurfaceId::Mask, Point::new(99.0, 1.0)));

    assert!(session.undo_mask());
    assert_eq!(session.mask_surface().polygon_count(), 1);
    assert!(session.undo_mask());
    assert!(!session.undo_mask());
    Ok(())
}

#[test]
fn test_interleaved_history_with_deletion() -> Result<()> {
    let mut session = result_session()?;

    // include A, remove B, include C
    stroke(&mut session, SurfaceId::Result, &rect(0.0, 0.0, 20.0, 20.0));
    session.set_edit_mode(EditMode::Remove);
    stroke(&mut session, SurfaceId::Result, &rect(40.0, 40.0, 60.0, 60.0));
    session.set_edit_mode(EditMode::Include);
    stroke(&mut session, SurfaceId::Result, &rect(70.0, 70.0, 90.0, 90.0));

    let categories: Vec<_> = session
        .edit_surface()
        .history()
        .iter()
        .map(|entry| entry.category)
        .collect();
    assert_eq!(
        categories,
        vec![EditMode::Include, EditMode::Remove, EditMode::Include]
    );

    // Delete A: history becomes [remove, include]
    assert!(session.context_click(SurfaceId::Result, Point::new(10.0, 10.0)));
    let categories: Vec<_> = session
        .edit_surface()
        .history()
        .iter()
        .map(|entry| entry.category)
        .collect();
    assert_eq!(categories, vec![EditMode::Remove, EditMode::Include]);

    // Undo removes C, then B
    assert_eq!(session.undo_edit(), Some(EditMode::Include));
    assert!(session.edit_surface().list(EditMode::Include).is_empty());
    assert_eq!(session.undo_edit(), Some(EditMode::Remove));
    assert!(session.edit_surface().is_empty());
    assert_eq!(session.undo_edit(), None);
    Ok(())
}

#[test]
fn test_include_then_undo_restores_plain_result() -> Result<()> {
    let mut session = result_session()?;
    stroke(&mut session, SurfaceId::Result, &rect(10.0, 10.0, 50.0, 50.0));
    assert!(session.composited_image().is_some());

    assert_eq!(session.undo_edit(), Some(EditMode::Include));
    assert!(session.edit_surface().list(EditMode::Include).is_empty());
    assert!(session.edit_surface().history().is_empty());
    assert!(session.composited_image().is_none());

    let artifact = session.export_image()?.expect("result export");
    let exported = ImageIOService::load_from_bytes(&artifact.bytes)?.to_rgba8();
    assert_eq!(*exported.get_pixel(20, 20), Rgba([0, 0, 255, 255]));
    Ok(())
}

#[test]
fn test_service_error_keeps_polygons_for_resubmission() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(64, 64, Rgba([9, 9, 9, 255]))?)?;
    stroke(&mut session, SurfaceId::Mask, &rect(4.0, 4.0, 40.0, 40.0));

    session.begin_submission()?;
    assert!(session.is_in_flight());
    assert_eq!(
        session.apply_service_event(ServiceEvent::Error("GPU unavailable".to_string())),
        Some(SubmissionStage::Failed)
    );
    assert_eq!(session.phase(), SessionPhase::Edit);
    assert_eq!(session.error(), Some("GPU unavailable"));
    assert!(!session.is_in_flight());
    assert_eq!(session.mask_surface().polygon_count(), 1);

    session.dismiss_error();
    assert!(session.error().is_none());
    assert!(session.can_submit());
    session.begin_submission()?;
    assert!(session.is_in_flight());
    Ok(())
}

#[test]
fn test_status_text_through_submission() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(32, 32, Rgba([9, 9, 9, 255]))?)?;
    stroke(&mut session, SurfaceId::Mask, &rect(1.0, 1.0, 30.0, 30.0));

    session.begin_submission()?;
    assert_eq!(session.status_text(), "Uploading…");
    let mask = ImageIOService::png_data_url(&DynamicImage::ImageLuma8(GrayImage::new(32, 32)))?;
    session.apply_service_event(ServiceEvent::Mask(format!("\"{}\"", mask)));
    assert_eq!(session.status_text(), "Mask received, generating result…");
    assert!(session.refined_mask().is_some());
    Ok(())
}

#[test]
fn test_new_image_resets_editing_state() -> Result<()> {
    let mut session = result_session()?;
    stroke(&mut session, SurfaceId::Result, &rect(10.0, 10.0, 50.0, 50.0));

    session.load_image(&encoded(300, 200, Rgba([1, 2, 3, 255]))?)?;
    assert_eq!(session.phase(), SessionPhase::Edit);
    assert!(session.mask_surface().is_empty());
    assert!(session.edit_surface().is_empty());
    assert!(session.result_image().is_none());
    assert!(session.refined_mask().is_none());
    assert_eq!(session.scale().natural_size(), (300, 200));
    Ok(())
}

#[test]
fn test_load_refused_while_in_flight() -> Result<()> {
    let mut session = EditorSession::default();
    session.load_image(&encoded(32, 32, Rgba([9, 9, 9, 255]))?)?;
    stroke(&mut session, SurfaceId::Mask, &rect(1.0, 1.0, 30.0, 30.0));
    session.begin_submission()?;

    let result = session.load_image(&encoded(16, 16, Rgba([0, 0, 0, 255]))?);
    assert!(matches!(result, Err(EditorError::InvalidState(_))));
    assert_eq!(session.phase(), SessionPhase::Loading);
    Ok(())
}

#[test]
fn test_script_replay_matches_pointer_calls() -> Result<()> {
    let config = EditorConfig::builder().max_display_width(50).build()?;
    let mut scripted = EditorSession::new(config.clone())?;
    let mut manual = EditorSession::new(config)?;
    let bytes = encoded(100, 100, Rgba([0, 0, 0, 255]))?;
    scripted.load_image(&bytes)?;
    manual.load_image(&bytes)?;

    let script = StrokeScript::from_json(
        r#"[
            {"action": "stroke", "points": [{"x": 5, "y": 5}, {"x": 25, "y": 5}, {"x": 25, "y": 25}, {"x": 5, "y": 25}]},
            {"action": "stroke", "points": [{"x": 30, "y": 30}, {"x": 45, "y": 30}, {"x": 45, "y": 45}]},
            {"action": "undo"}
        ]"#,
    )?;
    let summary = script.replay(&mut scripted, SurfaceId::Mask);
    assert_eq!(summary.committed, 2);
    assert_eq!(summary.undone, 1);

    stroke(&mut manual, SurfaceId::Mask, &rect(5.0, 5.0, 25.0, 25.0));
    assert_eq!(scripted.mask_raster(), manual.mask_raster());
    Ok(())
}

#[test]
fn test_edit_script_modes_on_result_surface() -> Result<()> {
    let mut session = result_session()?;
    let script = StrokeScript::from_json(
        r#"[
            {"action": "stroke", "points": [{"x": 0, "y": 0}, {"x": 50, "y": 0}, {"x": 50, "y": 50}, {"x": 0, "y": 50}]},
            {"action": "stroke", "mode": "remove", "points": [{"x": 25, "y": 25}, {"x": 75, "y": 25}, {"x": 75, "y": 75}, {"x": 25, "y": 75}]}
        ]"#,
    )?;
    let summary = script.replay(&mut session, SurfaceId::Result);
    assert_eq!(summary.committed, 2);
    // A per-stroke mode does not change the selected mode
    assert_eq!(session.edit_mode(), EditMode::Include);
    assert_eq!(session.edit_surface().list(EditMode::Include).len(), 1);
    assert_eq!(session.edit_surface().list(EditMode::Remove).len(), 1);

    let composite = session.composited_image().expect("composite");
    assert_eq!(*composite.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(composite.get_pixel(40, 40).0[3], 0);
    assert_eq!(*composite.get_pixel(90, 90), Rgba([0, 0, 255, 255]));
    Ok(())
}
