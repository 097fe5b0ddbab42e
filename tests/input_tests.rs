// Host-side tests for pure input helpers.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Spin,
    Slide,
}

#[test]
fn drag_reports_deltas_for_the_capturing_pointer_only() {
    let mut drag = DragState::<Action>::default();
    assert!(drag.advance(1, Vec2::new(5.0, 5.0)).is_none());

    drag.begin(Action::Spin, 7, Vec2::new(10.0, 20.0));
    assert!(drag.advance(8, Vec2::new(50.0, 50.0)).is_none());

    let (action, delta) = drag.advance(7, Vec2::new(13.0, 16.0)).unwrap();
    assert_eq!(action, Action::Spin);
    assert_eq!(delta, Vec2::new(3.0, -4.0));

    let (_, delta) = drag.advance(7, Vec2::new(13.0, 17.0)).unwrap();
    assert_eq!(delta, Vec2::new(0.0, 1.0));
}

#[test]
fn drag_end_requires_matching_pointer() {
    let mut drag = DragState::<Action>::default();
    assert!(!drag.end(3));
    drag.begin(Action::Slide, 3, Vec2::ZERO);
    assert!(!drag.end(4));
    assert!(drag.end(3));
    assert!(drag.action.is_none());
    assert!(drag.advance(3, Vec2::ONE).is_none());
}

#[test]
fn client_coordinates_scale_to_backing_pixels() {
    let p = client_to_canvas_px(
        Vec2::new(150.0, 100.0),
        Vec2::new(50.0, 50.0),
        Vec2::new(200.0, 100.0),
        Vec2::new(400.0, 200.0),
    );
    assert_eq!(p, Vec2::new(200.0, 100.0));
}

#[test]
fn collapsed_canvas_maps_to_origin() {
    let p = client_to_canvas_px(
        Vec2::new(10.0, 10.0),
        Vec2::ZERO,
        Vec2::new(0.0, 100.0),
        Vec2::new(1.0, 1.0),
    );
    assert_eq!(p, Vec2::ZERO);
}

#[test]
fn wheel_delta_modes_normalize_to_pixels() {
    assert_eq!(wheel_delta_px(120.0, 0), 120.0);
    assert_eq!(wheel_delta_px(3.0, 1), 3.0 * constants::WHEEL_DELTA_LINE_PX);
    assert_eq!(wheel_delta_px(-1.0, 2), -constants::WHEEL_DELTA_PAGE_PX);
}

#[test]
fn backing_size_applies_dpr_and_never_hits_zero() {
    assert_eq!(backing_size(800.0, 600.0, 2.0), (1600, 1200));
    assert_eq!(backing_size(0.0, 0.0, 1.0), (1, 1));
    assert_eq!(backing_size(-5.0, 10.0, 1.0), (1, 10));
}

#[test]
fn asset_urls_join_with_a_single_slash() {
    assert_eq!(asset_url("/", "phone_case.glb"), "/phone_case.glb");
    assert_eq!(asset_url("/assets/", "texture.jpg"), "/assets/texture.jpg");
    assert_eq!(asset_url("/assets", "texture.jpg"), "/assets/texture.jpg");
    assert_eq!(asset_url("/assets", "/other/model.glb"), "/other/model.glb");
    assert_eq!(
        asset_url("/", "https://cdn.example.com/case.glb"),
        "https://cdn.example.com/case.glb"
    );
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn frame_step_clamp_is_positive() {
    assert!(constants::MAX_FRAME_DT_SEC > 0.0);
    assert!(constants::MAX_FRAME_DT_SEC <= 1.0);
}

#[test]
fn drag_cancel_drops_any_owner() {
    let mut drag = DragState::<Action>::default();
    drag.begin(Action::Spin, 5, Vec2::ZERO);
    drag.cancel();
    assert!(drag.advance(5, Vec2::ONE).is_none());
}

#[test]
fn single_touch_is_not_a_pinch() {
    let mut touches = PinchTracker::default();
    assert_eq!(touches.press(1, Vec2::new(10.0, 10.0)), 1);
    assert!(!touches.is_pinching());
    assert!(touches.motion(1, Vec2::new(20.0, 10.0)).is_none());
    assert!(touches.release(1).is_none());
}

#[test]
fn spreading_fingers_shrinks_the_orbit_radius() {
    let mut touches = PinchTracker::default();
    touches.press(1, Vec2::new(100.0, 100.0));
    assert_eq!(touches.press(2, Vec2::new(200.0, 100.0)), 2);
    assert!(touches.is_pinching());

    let step = touches.motion(2, Vec2::new(300.0, 100.0)).unwrap();
    assert!((step.scale - 0.5).abs() < 1e-6);
    assert_eq!(step.pan, Vec2::new(50.0, 0.0));

    let step = touches.motion(1, Vec2::new(200.0, 100.0)).unwrap();
    assert!((step.scale - 2.0).abs() < 1e-6);
}

#[test]
fn two_fingers_moving_together_pan_without_zoom() {
    let mut touches = PinchTracker::default();
    touches.press(1, Vec2::new(0.0, 0.0));
    touches.press(2, Vec2::new(100.0, 0.0));
    let first = touches.motion(1, Vec2::new(0.0, 40.0)).unwrap();
    let second = touches.motion(2, Vec2::new(100.0, 40.0)).unwrap();
    assert!((first.scale * second.scale - 1.0).abs() < 1e-5);
    assert_eq!(first.pan + second.pan, Vec2::new(0.0, 40.0));
}

#[test]
fn third_finger_and_unknown_pointers_are_ignored() {
    let mut touches = PinchTracker::default();
    touches.press(1, Vec2::ZERO);
    touches.press(2, Vec2::new(10.0, 0.0));
    assert_eq!(touches.press(3, Vec2::new(50.0, 50.0)), 2);
    assert!(touches.motion(3, Vec2::ONE).is_none());
    assert!(touches.release(3).is_none());
}

#[test]
fn lifting_one_pinch_finger_returns_the_other() {
    let mut touches = PinchTracker::default();
    touches.press(1, Vec2::new(5.0, 5.0));
    touches.press(2, Vec2::new(50.0, 5.0));
    touches.motion(2, Vec2::new(60.0, 5.0));
    assert_eq!(touches.release(2), Some((1, Vec2::new(5.0, 5.0))));
    assert!(!touches.is_pinching());
    assert!(touches.release(1).is_none());
}

#[test]
fn coincident_fingers_do_not_produce_infinite_zoom() {
    let mut touches = PinchTracker::default();
    touches.press(1, Vec2::new(10.0, 10.0));
    touches.press(2, Vec2::new(10.0, 10.0));
    let step = touches.motion(2, Vec2::new(40.0, 10.0)).unwrap();
    assert_eq!(step.scale, 1.0);
}
