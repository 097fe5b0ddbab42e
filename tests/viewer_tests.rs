// End-to-end behaviour of the viewer session: viewport tiers, auto-fit
// scaling and the texture pass, without a GPU.

use case_core::*;
use glam::Vec3;

fn triangle_scene(points: [[f32; 3]; 3]) -> SceneGraph {
    let prim = Primitive::new(points.to_vec(), None, None, None, 0);
    SceneGraph::new(
        vec![Node {
            mesh: Some(0),
            ..Default::default()
        }],
        vec![0],
        vec![Mesh {
            name: None,
            primitives: vec![prim],
        }],
        vec![Material::default()],
    )
}

fn texture() -> TextureImage {
    TextureImage::new(1, 1, vec![255, 0, 0, 255])
}

fn loaded_session(width: f64, scene: SceneGraph) -> ViewerSession {
    let mut session = ViewerSession::new(ViewerConfig::default(), width, 800, 600);
    session.on_model_loaded(scene);
    session.on_texture_loaded(texture());
    session
}

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
}

#[test]
fn wide_viewport_with_diagonal_ten() {
    // 6-8-10 right triangle: bounding diagonal is exactly 10
    let scene = triangle_scene([[0.0, 0.0, 0.0], [6.0, 0.0, 0.0], [6.0, 8.0, 0.0]]);
    let session = loaded_session(1440.0, scene);
    assert_eq!(session.viewport().tier(), ViewportTier::Wide);
    assert_close(session.camera().eye.z, CAMERA_Z_NEAR);
    assert_close(session.render_scale(), 0.5);
}

#[test]
fn medium_viewport_with_diagonal_two() {
    let scene = triangle_scene([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
    let session = loaded_session(800.0, scene);
    assert_eq!(session.viewport().tier(), ViewportTier::Medium);
    assert_close(session.camera().eye.z, CAMERA_Z_NEAR);
    assert_close(session.render_scale(), 2.25);
}

#[test]
fn narrow_viewport_with_degenerate_bounds() {
    let scene = triangle_scene([[1.0, 1.0, 1.0]; 3]);
    let session = loaded_session(500.0, scene);
    assert_eq!(session.viewport().tier(), ViewportTier::Narrow);
    assert_close(session.camera().eye.z, CAMERA_Z_FAR);
    assert_eq!(
        session.fit_state(),
        FitState::Measured {
            scene: session.scene().unwrap().id(),
            metric: FitMetric::DEFAULT
        }
    );
    assert_close(session.render_scale(), 4.0);
}

#[test]
fn tier_boundaries_are_exclusive_above() {
    assert_eq!(ViewportTier::from_width(1201.0), ViewportTier::Wide);
    assert_eq!(ViewportTier::from_width(1200.0), ViewportTier::Medium);
    assert_eq!(ViewportTier::from_width(769.0), ViewportTier::Medium);
    assert_eq!(ViewportTier::from_width(768.0), ViewportTier::Narrow);
    assert_eq!(ViewportTier::from_width(0.0), ViewportTier::Narrow);
}

#[test]
fn resize_moves_camera_and_rescales_without_remeasuring() {
    let scene = triangle_scene([[0.0, 0.0, 0.0], [6.0, 0.0, 0.0], [6.0, 8.0, 0.0]]);
    let mut session = loaded_session(1440.0, scene);
    let measured = session.fit_state();

    let update = session.on_resize(500.0);
    assert!(update.tier_changed());
    assert_eq!(update.previous, ViewportTier::Wide);
    assert_eq!(update.tier, ViewportTier::Narrow);
    assert_close(session.camera().eye.z, CAMERA_Z_FAR);
    assert_close(session.render_scale(), 0.4);
    assert_eq!(session.fit_state(), measured);

    let update = session.on_resize(1000.0);
    assert_eq!(update.tier, ViewportTier::Medium);
    assert_close(session.camera().eye.z, CAMERA_Z_NEAR);
    assert_close(session.render_scale(), 0.45);
}

#[test]
fn resize_within_a_tier_keeps_camera_distance() {
    let mut session = ViewerSession::new(ViewerConfig::default(), 1300.0, 800, 600);
    let update = session.on_resize(1900.0);
    assert!(!update.tier_changed());
    assert_eq!(session.viewport().width(), 1900.0);
    assert_close(session.camera().eye.z, CAMERA_Z_NEAR);
}

#[test]
fn nothing_is_ready_until_both_assets_arrive() {
    let mut session = ViewerSession::new(ViewerConfig::default(), 1440.0, 800, 600);
    assert!(!session.is_ready());
    assert_eq!(session.fit_state(), FitState::Unloaded);

    let scene = triangle_scene([[0.0, 0.0, 0.0], [6.0, 0.0, 0.0], [6.0, 8.0, 0.0]]);
    let id = scene.id();
    session.on_model_loaded(scene);
    assert!(!session.is_ready());
    assert_eq!(session.fit_state(), FitState::LoadedUnmeasured { scene: id });
    assert!(session.ready_scene_mut().is_none());

    session.on_texture_loaded(texture());
    assert!(session.is_ready());
    assert!(session.ready_scene_mut().is_some());
}

#[test]
fn texture_first_then_model_reaches_the_same_state() {
    let mut session = ViewerSession::new(ViewerConfig::default(), 1440.0, 800, 600);
    session.on_texture_loaded(texture());
    assert!(!session.is_ready());
    session.on_model_loaded(triangle_scene([
        [0.0, 0.0, 0.0],
        [6.0, 0.0, 0.0],
        [6.0, 8.0, 0.0],
    ]));
    assert!(session.is_ready());
    assert_close(session.render_scale(), 0.5);
}

#[test]
fn texture_pass_is_idempotent_per_instance_pair() {
    let mut scene = triangle_scene([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let tex = std::sync::Arc::new(texture());
    let mut pass = TexturePass::new();

    assert!(pass.apply(&mut scene, &tex));
    assert_eq!(scene.materials[0].map.as_ref().unwrap().id(), tex.id());
    scene.materials[0].needs_update = false;

    assert!(!pass.apply(&mut scene, &tex));
    assert!(!scene.materials[0].needs_update);

    let other = std::sync::Arc::new(texture());
    assert!(pass.apply(&mut scene, &other));
    assert_eq!(scene.materials[0].map.as_ref().unwrap().id(), other.id());
    assert!(scene.materials[0].needs_update);
}

#[test]
fn new_model_instance_is_measured_again() {
    let mut session = loaded_session(
        1440.0,
        triangle_scene([[0.0, 0.0, 0.0], [6.0, 0.0, 0.0], [6.0, 8.0, 0.0]]),
    );
    assert_close(session.render_scale(), 0.5);

    session.on_model_loaded(triangle_scene([
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
    ]));
    assert!(session.is_ready());
    assert_close(session.render_scale(), 2.5);
    let mat = &session.scene().unwrap().materials[0];
    assert!(mat.map.is_some());
}

#[test]
fn model_matrix_is_uniform_render_scale() {
    let session = loaded_session(
        800.0,
        triangle_scene([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 0.0]]),
    );
    let p = session.model_matrix().transform_point3(Vec3::new(1.0, -2.0, 4.0));
    assert!(p.abs_diff_eq(Vec3::new(2.25, -4.5, 9.0), 1e-5));
}
