// Orbit camera behaviour as driven through the viewer session.

use case_core::*;
use glam::Vec3;

fn session() -> ViewerSession {
    ViewerSession::new(ViewerConfig::default(), 1440.0, 800, 600)
}

fn settle(s: &mut ViewerSession) {
    for _ in 0..600 {
        s.tick(1.0 / 60.0);
    }
}

#[test]
fn buttons_map_to_orbit_actions() {
    assert_eq!(OrbitAction::for_button(0, false), Some(OrbitAction::Rotate));
    assert_eq!(OrbitAction::for_button(0, true), Some(OrbitAction::Pan));
    assert_eq!(OrbitAction::for_button(1, false), Some(OrbitAction::Dolly));
    assert_eq!(OrbitAction::for_button(2, false), Some(OrbitAction::Pan));
    assert_eq!(OrbitAction::for_button(3, false), None);
}

#[test]
fn wheel_zoom_in_and_out() {
    let mut s = session();
    s.zoom(-100.0);
    s.tick(1.0 / 60.0);
    assert!((s.orbit().distance() - 0.95).abs() < 1e-5);

    s.zoom(100.0);
    s.tick(1.0 / 60.0);
    assert!((s.orbit().distance() - 1.0).abs() < 1e-5);
}

#[test]
fn zoom_is_clamped_to_min_distance() {
    let mut s = session();
    for _ in 0..200 {
        s.zoom(-1000.0);
        s.tick(1.0 / 60.0);
    }
    assert!((s.orbit().distance() - ORBIT_MIN_DISTANCE).abs() < 1e-5);
}

#[test]
fn rotation_eases_out_and_keeps_distance() {
    let mut s = session();
    s.drag(OrbitAction::Rotate, 100.0, 0.0);
    assert!(s.tick(1.0 / 60.0));
    let first = s.camera().eye;
    assert!(first.x.abs() > 0.0);
    assert!(!s.orbit().is_settled());

    settle(&mut s);
    assert!(s.orbit().is_settled());
    let eye = s.camera().eye;
    assert!(eye.x.abs() > first.x.abs());
    assert!((eye.length() - 1.0).abs() < 1e-4);
}

#[test]
fn vertical_rotation_stops_at_the_pole() {
    let mut s = session();
    s.drag(OrbitAction::Rotate, 0.0, 100_000.0);
    settle(&mut s);
    let eye = s.camera().eye;
    assert!(eye.y > 0.99);
    assert!(eye.y <= 1.0);
}

#[test]
fn pan_moves_eye_and_target_together() {
    let mut s = session();
    s.drag(OrbitAction::Pan, -60.0, 0.0);
    settle(&mut s);
    let target = s.orbit().target();
    let eye = s.camera().eye;
    assert!(target.x > 0.0);
    assert!(target.y.abs() < 1e-4);
    assert!((eye - target - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-4);
    assert_eq!(s.camera().target, target);
}

#[test]
fn dolly_drag_down_moves_away() {
    let mut s = session();
    s.drag(OrbitAction::Dolly, 0.0, 50.0);
    s.tick(1.0 / 60.0);
    assert!(s.orbit().distance() > 1.0);
}

#[test]
fn tier_change_resets_camera_and_drops_inertia() {
    let mut s = session();
    s.drag(OrbitAction::Rotate, 300.0, 0.0);
    s.tick(1.0 / 60.0);
    s.on_resize(600.0);
    assert!(s.orbit().is_settled());
    assert_eq!(s.camera().eye, Vec3::new(0.0, 0.0, CAMERA_Z_FAR));
    settle(&mut s);
    assert!((s.camera().eye - Vec3::new(0.0, 0.0, CAMERA_Z_FAR)).length() < 1e-4);
}

#[test]
fn disabled_damping_applies_motion_at_once() {
    let mut s = session();
    s.orbit_mut().enable_damping = false;
    s.drag(OrbitAction::Rotate, 100.0, 0.0);
    s.tick(1.0 / 60.0);
    assert!(s.orbit().is_settled());
}

#[test]
fn pinch_scales_radius_and_pans_target() {
    let mut s = session();
    s.pinch(0.5, -40.0, 0.0);
    settle(&mut s);
    assert!((s.orbit().distance() - 0.5).abs() < 1e-4);
    assert!(s.orbit().target().x > 0.0);
}

#[test]
fn degenerate_pinch_factors_are_ignored() {
    let mut s = session();
    s.pinch(0.0, 0.0, 0.0);
    s.pinch(f32::NAN, 0.0, 0.0);
    s.pinch(-2.0, 0.0, 0.0);
    s.tick(1.0 / 60.0);
    assert!((s.orbit().distance() - 1.0).abs() < 1e-5);
}
