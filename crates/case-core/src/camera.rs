//! Camera description and pointer-driven orbit controls.
//!
//! These types avoid referencing platform-specific APIs; both frontends feed
//! pointer deltas in pixels and read back the eye/target pair.

use crate::constants::*;
use glam::{Mat4, Vec2, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z_NEAR),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

/// Offset from the orbit target in polar form. `phi` is measured from +Y,
/// `theta` around +Y starting at +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// What a pointer drag does. Buttons use DOM numbering (0 primary,
/// 1 middle, 2 secondary); native frontends map onto the same numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitAction {
    Rotate,
    Pan,
    Dolly,
}

impl OrbitAction {
    pub fn for_button(button: i16, pan_modifier: bool) -> Option<Self> {
        match button {
            0 if pan_modifier => Some(OrbitAction::Pan),
            0 => Some(OrbitAction::Rotate),
            1 => Some(OrbitAction::Dolly),
            2 => Some(OrbitAction::Pan),
            _ => None,
        }
    }
}

/// Orbit/pan/zoom around a target point with optional inertia.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    eye: Vec3,
    target: Vec3,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    // pending (theta, phi) rotation
    rotate_delta: Vec2,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            enable_damping: true,
            damping_factor: ORBIT_DAMPING_FACTOR,
            rotate_speed: ORBIT_ROTATE_SPEED,
            pan_speed: ORBIT_PAN_SPEED,
            zoom_speed: ORBIT_ZOOM_SPEED,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// Move the eye directly, keeping the target, and drop pending inertia.
    pub fn set_position(&mut self, eye: Vec3) {
        self.eye = eye;
        self.rotate_delta = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Pointer drag in pixels; a full viewport height is one full turn.
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32, viewport_height_px: f32) {
        if !self.enable_rotate {
            return;
        }
        let h = viewport_height_px.max(1.0);
        let k = std::f32::consts::TAU * self.rotate_speed / h;
        self.rotate_delta.x -= dx_px * k;
        self.rotate_delta.y -= dy_px * k;
    }

    /// Screen-space pan so the point under the cursor tracks the pointer at
    /// the target's depth.
    pub fn pan(&mut self, dx_px: f32, dy_px: f32, viewport_height_px: f32, fovy_radians: f32) {
        if !self.enable_pan {
            return;
        }
        let h = viewport_height_px.max(1.0);
        let target_distance = self.distance() * (fovy_radians * 0.5).tan();
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        let k = 2.0 * target_distance * self.pan_speed / h;
        self.pan_offset += right * (-dx_px * k) + up * (dy_px * k);
    }

    /// Wheel zoom. Negative `delta_y` moves toward the target.
    pub fn zoom(&mut self, delta_y: f32) {
        if !self.enable_zoom || delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = 0.95_f32.powf(self.zoom_speed * (delta_y * 0.01).abs());
        if delta_y < 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
    }

    /// Multiply the orbit radius directly (pinch). Values below 1 move closer.
    pub fn dolly_by(&mut self, factor: f32) {
        if !self.enable_zoom || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.scale *= factor;
    }

    /// Advance by `dt_sec`, applying a share of the pending motion. Returns
    /// whether the eye or target moved.
    pub fn update(&mut self, dt_sec: f32) -> bool {
        let before = (self.eye, self.target);
        let share = if self.enable_damping {
            let frames = (dt_sec.max(0.0) * 60.0).min(60.0);
            1.0 - (1.0 - self.damping_factor.clamp(0.0, 1.0)).powf(frames)
        } else {
            1.0
        };

        let mut sph = Spherical::from_offset(self.eye - self.target);
        sph.theta += self.rotate_delta.x * share;
        sph.phi += self.rotate_delta.y * share;
        sph.phi = sph
            .phi
            .clamp(ORBIT_POLAR_EPSILON, std::f32::consts::PI - ORBIT_POLAR_EPSILON);
        sph.radius = (sph.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * share;
        self.eye = self.target + sph.to_offset();

        if self.enable_damping {
            self.rotate_delta *= 1.0 - share;
            self.pan_offset *= 1.0 - share;
            if self.rotate_delta.length_squared() < 1e-12 {
                self.rotate_delta = Vec2::ZERO;
            }
            if self.pan_offset.length_squared() < 1e-12 {
                self.pan_offset = Vec3::ZERO;
            }
        } else {
            self.rotate_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (self.eye, self.target) != before
    }

    pub fn is_settled(&self) -> bool {
        self.rotate_delta == Vec2::ZERO && self.pan_offset == Vec3::ZERO && self.scale == 1.0
    }

    pub fn apply_to(&self, camera: &mut Camera) {
        camera.eye = self.eye;
        camera.target = self.target;
    }
}
