use glam::Vec3;

// Shared tuning constants used by both web and native frontends.

// Responsive tiers (CSS pixels). Widths strictly above a threshold belong to the wider tier.
pub const WIDE_MIN_WIDTH_EXCLUSIVE: f64 = 1200.0;
pub const MEDIUM_MIN_WIDTH_EXCLUSIVE: f64 = 768.0;

// Per-tier shrink applied on top of the auto-fit scale
pub const DAMPING_WIDE: f32 = 1.0;
pub const DAMPING_MEDIUM: f32 = 0.9;
pub const DAMPING_NARROW: f32 = 0.8;

// Camera depth along +Z. Wide and Medium share the near value.
pub const CAMERA_Z_NEAR: f32 = 1.0;
pub const CAMERA_Z_FAR: f32 = 2.0; // narrow viewports sit further back

// Auto-fit: the model's bounding diagonal is normalized to this size
pub const FIT_TARGET_SIZE: f32 = 5.0;

// Perspective defaults
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Lighting
pub const AMBIENT_INTENSITY: f32 = 1.2;
pub const DIRECTIONAL_INTENSITY: f32 = 1.0;
pub const DIRECTIONAL_POSITION: [f32; 3] = [5.0, 5.0, 5.0];

// Page background #f5f5f5
pub const CLEAR_COLOR_SRGB: [u8; 3] = [0xf5, 0xf5, 0xf5];

// Orbit controls
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_PAN_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_SPEED: f32 = 1.0;
pub const ORBIT_DAMPING_FACTOR: f32 = 0.05; // per 60Hz frame
pub const ORBIT_MIN_DISTANCE: f32 = 0.05;
pub const ORBIT_MAX_DISTANCE: f32 = 500.0;
pub const ORBIT_POLAR_EPSILON: f32 = 1e-6;

// Asset locations relative to the host's asset root
pub const MODEL_PATH: &str = "phone_case.glb";
pub const TEXTURE_PATH: &str = "texture.jpg";

#[inline]
pub fn directional_position_vec3() -> Vec3 {
    Vec3::from(DIRECTIONAL_POSITION)
}

/// Convert one 8-bit sRGB channel to linear light.
#[inline]
pub fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
pub fn clear_color_linear() -> [f32; 3] {
    [
        srgb_to_linear(CLEAR_COLOR_SRGB[0]),
        srgb_to_linear(CLEAR_COLOR_SRGB[1]),
        srgb_to_linear(CLEAR_COLOR_SRGB[2]),
    ]
}
