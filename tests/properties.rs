mod common;

use common::synthetic_image::{c_shape_subject, gradient_background, horizontal_ramp_depth, rect_subject};
use common::{approx_eq, init_logging};
use shadow_synth::image::{DepthMap, ImageF32};
use shadow_synth::stages::{
    ContactLineEstimator, LightModel, ParameterAdjustment, ShadowProjector,
};
use shadow_synth::{
    LightSettings, Notice, ShadowOutputs, ShadowParams, ShadowRequest, ShadowSynthesizer,
    SynthesisReport,
};

fn run(
    params: ShadowParams,
    subject: (image::RgbaImage, ImageF32),
    depth: Option<&DepthMap>,
    light: LightSettings,
) -> SynthesisReport {
    let background = gradient_background(400, 300);
    ShadowSynthesizer::new(params)
        .process_with_diagnostics(&ShadowRequest {
            background: &background,
            subject: &subject.0,
            mask: &subject.1,
            depth,
            light,
        })
        .expect("synthesis succeeds")
}

fn light(angle_deg: f32, elevation_deg: f32) -> LightSettings {
    LightSettings {
        angle_deg,
        elevation_deg,
    }
}

fn reach_at(elevation_deg: f32) -> f32 {
    let mut mask = ImageF32::new(800, 300);
    for y in 100..300 {
        mask.set(40, y, 1.0);
    }
    let contact = ContactLineEstimator::default().estimate(&mask);
    let light = LightModel::default().resolve(0.0, elevation_deg);
    ShadowProjector::default().project(&mask, &contact, &light).reach_px
}

#[test]
fn shadow_length_follows_the_elevation_law() {
    init_logging();
    let height = 199.5f32;
    for elevation in [15.0f32, 30.0, 45.0, 60.0, 75.0] {
        let expected = height / elevation.to_radians().tan();
        let reach = reach_at(elevation);
        assert!(
            approx_eq(reach, expected, expected * 1e-4 + 1e-3),
            "elevation {elevation}: reach {reach}, expected {expected}"
        );
    }
    let mut previous = f32::INFINITY;
    for elevation in [1.0f32, 10.0, 30.0, 50.0, 70.0, 89.0, 90.0] {
        let reach = reach_at(elevation);
        assert!(reach.is_finite());
        assert!(reach <= previous, "reach grew at elevation {elevation}");
        previous = reach;
    }
    assert_eq!(reach_at(90.0), 0.0);
}

#[test]
fn absent_and_flat_depth_give_identical_shadows() {
    init_logging();
    let params = ShadowParams::default();
    let sun = light(300.0, 40.0);
    let reference = run(params, rect_subject(80, 160), None, sun);
    assert_eq!(reference.trace.depth_warp.map(|d| d.applied), Some(false));

    for value in [0.0f32, 0.42, 1.0] {
        let flat = ImageF32::filled(400, 300, value);
        let warped = run(params, rect_subject(80, 160), Some(&flat), sun);
        assert_eq!(warped.trace.depth_warp.map(|d| d.max_offset_px), Some(0.0));
        assert_same_outputs(&reference.outputs, &warped.outputs);
    }
}

fn assert_same_outputs(a: &ShadowOutputs, b: &ShadowOutputs) {
    assert_eq!(a.shadow_layer, b.shadow_layer);
    assert_eq!(a.composite.as_raw(), b.composite.as_raw());
    assert_eq!(a.shadow_only.as_raw(), b.shadow_only.as_raw());
}

#[test]
fn sloped_depth_moves_the_shadow() {
    init_logging();
    let params = ShadowParams::default();
    let sun = light(0.0, 45.0);
    let flat = run(params, rect_subject(60, 120), None, sun);
    let ramp = horizontal_ramp_depth(400, 300);
    let warped = run(params, rect_subject(60, 120), Some(&ramp), sun);
    let stats = warped.trace.depth_warp.expect("depth warp stage");
    assert!(stats.applied);
    assert!(stats.max_offset_px > 0.0 && stats.max_offset_px <= 10.0 + 1e-3);
    assert_ne!(flat.outputs.shadow_layer, warped.outputs.shadow_layer);
}

#[test]
fn overlapping_projection_never_overflows() {
    init_logging();
    for (angle, elevation) in [(0.0, 30.0), (200.0, 20.0), (315.0, 10.0)] {
        let report = run(
            ShadowParams::default(),
            c_shape_subject(120, 160, 18),
            None,
            light(angle, elevation),
        );
        let layer = &report.outputs.shadow_layer;
        assert!(layer.data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(layer.max_value() > 0.0);
        let falloff = report.trace.falloff.as_ref().expect("falloff stage");
        assert!(falloff.max_opacity <= 1.0);
    }
}

#[test]
fn opacity_decreases_away_from_the_contact_line() {
    init_logging();
    let report = run(ShadowParams::default(), rect_subject(60, 40), None, light(270.0, 20.0));
    let layer = &report.outputs.shadow_layer;
    // the shadow runs straight up the column above the subject
    let column: Vec<f32> = (0..255).rev().map(|y| layer.get(200, y)).collect();
    for (i, pair) in column.windows(2).enumerate() {
        assert!(
            pair[1] <= pair[0] + 1e-5,
            "opacity increased at row {}: {} -> {}",
            254 - i,
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn degenerate_light_parameters_are_recovered_and_reported() {
    init_logging();
    let grazing = run(ShadowParams::default(), rect_subject(40, 80), None, light(0.0, 0.0));
    assert!(grazing.trace.notices.contains(&Notice::DegenerateParameter {
        adjustment: ParameterAdjustment::ElevationClamped { from: 0.0, to: 1.0 },
    }));
    assert!(grazing.trace.light.length_factor.is_finite());
    assert!(grazing.outputs.shadow_layer.data.iter().all(|v| v.is_finite()));

    let overhead = run(ShadowParams::default(), rect_subject(40, 80), None, light(0.0, 120.0));
    assert_eq!(overhead.trace.light.elevation_deg, 90.0);
    assert_eq!(overhead.trace.projection.as_ref().map(|p| p.reach_px), Some(0.0));

    // wrapping a finite angle is ordinary input, not a degenerate one
    let wrapped = run(ShadowParams::default(), rect_subject(40, 80), None, light(-90.0, 45.0));
    assert!(approx_eq(wrapped.trace.light.angle_deg, 270.0, 1e-4));
    assert!(!wrapped.trace.notices.iter().any(Notice::is_degenerate_parameter));

    let nan = run(ShadowParams::default(), rect_subject(40, 80), None, light(f32::NAN, 45.0));
    assert_eq!(nan.trace.light.angle_deg, 0.0);
    assert!(nan.trace.notices.iter().any(Notice::is_degenerate_parameter));
}

#[test]
fn requests_on_a_shared_synthesizer_are_independent() {
    init_logging();
    let synthesizer = ShadowSynthesizer::default();
    let background = gradient_background(200, 150);
    let (subject, mask) = rect_subject(30, 60);
    let request = |angle: f32| ShadowRequest {
        background: &background,
        subject: &subject,
        mask: &mask,
        depth: None,
        light: light(angle, 35.0),
    };
    let first = synthesizer.process(&request(30.0)).expect("first");
    let _other = synthesizer.process(&request(160.0)).expect("other");
    let again = synthesizer.process(&request(30.0)).expect("again");
    assert_same_outputs(&first, &again);

    let threads: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = [30.0f32, 30.0]
            .into_iter()
            .map(|angle| {
                let synthesizer = &synthesizer;
                let req = request(angle);
                scope.spawn(move || synthesizer.process(&req).expect("threaded"))
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });
    for out in &threads {
        assert_same_outputs(&first, out);
    }
}
