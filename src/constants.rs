// Host page wiring for the web frontend.

// Canvas the viewer draws into
pub const CANVAS_ID: &str = "app-canvas";

// Optional canvas attributes overriding the asset locations
pub const MODEL_ATTR: &str = "data-model";
pub const TEXTURE_ATTR: &str = "data-texture";

// Asset root on the serving host
pub const ASSET_BASE_URL: &str = "/";

// WheelEvent.deltaMode scaling to pixels
pub const WHEEL_DELTA_LINE_PX: f32 = 16.0;
pub const WHEEL_DELTA_PAGE_PX: f32 = 100.0;

// Clamp for a single frame step fed to the orbit damping (seconds)
pub const MAX_FRAME_DT_SEC: f32 = 0.1;
