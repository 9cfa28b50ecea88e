//! Integration tests for the pipeline controller.
//!
//! Tests cover:
//! - No-op behaviour while no image is loaded
//! - Slider updates recomputing from the original
//! - Failed operations leaving the display untouched
//! - Classification readouts

mod common;

use common::*;
use mammoscope::{DisplayState, PipelineController, apply_window};

fn controller_with(binary: Model, multiclass: Model) -> PipelineController {
    PipelineController::new(ModelRegistry::new(binary, multiclass))
}

#[test]
fn operations_without_image_are_noops() -> anyhow::Result<()> {
    let mut controller = PipelineController::new(ModelRegistry::empty());

    controller.apply_windowing();
    controller.reset_to_original();
    controller.set_window_min(40);
    assert!(controller.displayed().is_none());
    assert!(controller.apply_segmentation()?.is_none());
    assert!(controller.apply_classification_binary()?.is_none());
    assert!(controller.apply_classification_multiclass()?.is_none());
    Ok(())
}

#[test]
fn open_image_converts_to_grayscale() -> anyhow::Result<()> {
    let file = write_rgb_png(48, 40, [90, 90, 90]);
    let mut controller = PipelineController::new(ModelRegistry::empty());

    controller.open_image(file.path())?;

    let original = controller.original().ok_or_else(|| anyhow::anyhow!("no image"))?;
    assert_eq!(original.dimensions(), (48, 40));
    assert!(original.as_raw().iter().all(|&v| v == 90));
    assert_eq!(controller.displayed(), controller.original());
    assert_eq!(controller.state(), DisplayState::Original);
    Ok(())
}

#[test]
fn slider_changes_recompute_from_original() {
    let original = gradient(256, 8);
    let mut controller = PipelineController::new(ModelRegistry::empty());
    controller.set_image(original.clone());

    // Not windowing yet: the slider only records the value
    controller.set_window_min(50);
    assert_eq!(controller.displayed(), Some(&original));

    controller.apply_windowing();
    assert_eq!(controller.state(), DisplayState::Windowed);

    let spec = controller.set_window_max(120);
    assert_eq!(spec, WindowSpec::new(50, 120));
    let expected = apply_window(&original, spec);
    assert_eq!(controller.displayed(), Some(&expected));

    controller.set_window_min(60);
    let expected = apply_window(&original, WindowSpec::new(60, 120));
    assert_eq!(controller.displayed(), Some(&expected));

    controller.reset_to_original();
    assert_eq!(controller.displayed(), Some(&original));
    assert_eq!(controller.state(), DisplayState::Original);
}

#[test]
fn repeated_windowing_does_not_compose() {
    let original = gradient(256, 4);
    let mut controller = PipelineController::new(ModelRegistry::empty());
    controller.set_image(original.clone());

    let spec = WindowSpec::new(50, 150);
    controller.apply_window(spec);
    let once = controller.displayed().cloned();
    controller.apply_windowing();
    let twice = controller.displayed().cloned();

    let expected = apply_window(&original, spec);
    assert_eq!(once.as_ref(), Some(&expected));
    assert_eq!(twice, once);
    // Windowing the windowed image again would stretch it further
    assert_ne!(apply_window(&expected, spec), expected);
}

#[test]
fn failed_segmentation_keeps_display() {
    let small = uniform(20, 20, 128);
    let mut controller = PipelineController::new(ModelRegistry::empty());
    controller.set_image(small.clone());

    assert!(matches!(
        controller.apply_segmentation(),
        Err(PipelineError::InvalidDimensions { .. })
    ));
    assert_eq!(controller.displayed(), Some(&small));
    assert_eq!(controller.state(), DisplayState::Original);
}

#[test]
fn segmentation_replaces_display_with_region() -> anyhow::Result<()> {
    let mut controller = PipelineController::new(ModelRegistry::empty());
    controller.set_image(square_on_black(64, 25, 25, 10));

    let area = controller.apply_segmentation()?.map(|r| r.area);
    assert_eq!(area, Some(100));
    assert_eq!(controller.state(), DisplayState::Segmented);
    assert_eq!(controller.displayed().map(|img| img.dimensions()), Some((34, 34)));
    Ok(())
}

#[test]
fn classification_uses_selected_model() -> anyhow::Result<()> {
    let (binary, binary_calls) = fixed_model("binary", &[0.2, 0.8]);
    let (multiclass, multi_calls) = fixed_model("multiclass", &[0.1, 0.6, 0.2, 0.1]);
    let mut controller = controller_with(binary, multiclass);
    let img = square_on_black(64, 20, 20, 20);
    controller.set_image(img.clone());

    let label = controller.apply_classification_binary()?.map(|r| r.label.clone());
    assert_eq!(label.as_deref(), Some("III"));
    assert_eq!(call_count(&binary_calls), 1);
    assert_eq!(call_count(&multi_calls), 0);
    // Classifying does not change what is displayed
    assert_eq!(controller.displayed(), Some(&img));

    let label = controller.apply_classification_multiclass()?.map(|r| r.label.clone());
    assert_eq!(label.as_deref(), Some("II"));
    assert_eq!(call_count(&multi_calls), 1);
    assert_eq!(controller.last_classification().map(|r| r.class_index), Some(1));
    Ok(())
}

#[test]
fn missing_model_reports_unavailable_before_segmenting() {
    let (multiclass, _) = fixed_model("multiclass", &[0.25; 4]);
    let mut controller = controller_with(Model::unloaded("binary"), multiclass);
    // Too small to segment, but the model check comes first
    controller.set_image(uniform(16, 16, 100));

    assert!(matches!(
        controller.apply_classification_binary(),
        Err(PipelineError::ModelUnavailable(_))
    ));
    assert!(controller.last_classification().is_none());
}
