//! Frontend-agnostic viewer state: viewport tier, camera, orbit controls and
//! the loaded model. Web and native frontends forward host events here and
//! read back what to draw.

use crate::autofit::{AutoFitScaler, FitState};
use crate::camera::{Camera, OrbitAction, OrbitControls};
use crate::config::ViewerConfig;
use crate::scene::SceneGraph;
use crate::texture::{TextureImage, TexturePass};
use crate::viewport::{ViewportState, ViewportUpdate};
use glam::{Mat4, Vec3};
use std::sync::Arc;

pub struct ViewerSession {
    config: ViewerConfig,
    viewport: ViewportState,
    camera: Camera,
    orbit: OrbitControls,
    scaler: AutoFitScaler,
    texture_pass: TexturePass,
    scene: Option<SceneGraph>,
    texture: Option<Arc<TextureImage>>,
    surface_height: f32,
}

impl ViewerSession {
    /// Mount: classify the initial width and place the camera for its tier.
    pub fn new(config: ViewerConfig, viewport_width: f64, surface_w: u32, surface_h: u32) -> Self {
        let viewport = ViewportState::new(viewport_width);
        let eye = viewport.tier().camera_position();
        let mut camera = Camera {
            eye,
            ..Default::default()
        };
        camera.set_viewport_size(surface_w, surface_h);
        let orbit = OrbitControls::new(eye, Vec3::ZERO);
        log::info!(
            "[viewport] mounted width={:.0} tier={:?} camera_z={:.2}",
            viewport_width,
            viewport.tier(),
            eye.z
        );
        Self {
            scaler: AutoFitScaler::new(config.fit_target),
            config,
            viewport,
            camera,
            orbit,
            texture_pass: TexturePass::new(),
            scene: None,
            texture: None,
            surface_height: surface_h.max(1) as f32,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    /// Resize notification from the host. Re-places the camera for the new
    /// tier; the scale picks the tier up at read time without re-measuring.
    pub fn on_resize(&mut self, viewport_width: f64) -> ViewportUpdate {
        let update = self.viewport.update(viewport_width);
        self.orbit.set_position(update.camera_position);
        self.orbit.apply_to(&mut self.camera);
        update
    }

    /// Drawing surface size in physical pixels.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.camera.set_viewport_size(width, height);
        self.surface_height = height.max(1) as f32;
    }

    pub fn on_model_loaded(&mut self, scene: SceneGraph) {
        self.scaler.on_loaded(&scene);
        self.scene = Some(scene);
        self.prepare();
    }

    pub fn on_texture_loaded(&mut self, texture: TextureImage) {
        self.texture = Some(Arc::new(texture));
        self.prepare();
    }

    // Runs the texture pass and the measurement once both inputs exist.
    fn prepare(&mut self) {
        let (Some(scene), Some(texture)) = (self.scene.as_mut(), self.texture.as_ref()) else {
            return;
        };
        self.texture_pass.apply(scene, texture);
        self.scaler.measure(scene);
    }

    /// Both assets are in and processed; until then nothing is drawn.
    pub fn is_ready(&self) -> bool {
        match (&self.scene, &self.texture) {
            (Some(scene), Some(texture)) => {
                self.texture_pass.is_applied(scene, texture)
                    && matches!(self.scaler.state(), FitState::Measured { scene: id, .. } if id == scene.id())
            }
            _ => false,
        }
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    /// The scene once it is ready to draw.
    pub fn ready_scene_mut(&mut self) -> Option<&mut SceneGraph> {
        if self.is_ready() {
            self.scene.as_mut()
        } else {
            None
        }
    }

    pub fn fit_state(&self) -> FitState {
        self.scaler.state()
    }

    pub fn render_scale(&self) -> f32 {
        self.scaler.render_scale(self.viewport.tier())
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.render_scale()))
    }

    pub fn rotate(&mut self, dx_px: f32, dy_px: f32) {
        self.orbit.rotate(dx_px, dy_px, self.surface_height);
    }

    pub fn pan(&mut self, dx_px: f32, dy_px: f32) {
        self.orbit
            .pan(dx_px, dy_px, self.surface_height, self.camera.fovy_radians);
    }

    pub fn zoom(&mut self, delta_y: f32) {
        self.orbit.zoom(delta_y);
    }

    /// Two-finger gesture: `scale` multiplies the orbit radius, the midpoint
    /// motion pans.
    pub fn pinch(&mut self, scale: f32, pan_dx_px: f32, pan_dy_px: f32) {
        self.orbit.dolly_by(scale);
        self.pan(pan_dx_px, pan_dy_px);
    }

    /// Route a pointer drag delta to the control selected at drag start.
    /// Dragging down while dollying moves away, like a positive wheel delta.
    pub fn drag(&mut self, action: OrbitAction, dx_px: f32, dy_px: f32) {
        match action {
            OrbitAction::Rotate => self.rotate(dx_px, dy_px),
            OrbitAction::Pan => self.pan(dx_px, dy_px),
            OrbitAction::Dolly => self.zoom(dy_px),
        }
    }

    /// Per-frame update of the orbit controls. Returns whether the camera moved.
    pub fn tick(&mut self, dt_sec: f32) -> bool {
        let moved = self.orbit.update(dt_sec);
        self.orbit.apply_to(&mut self.camera);
        moved
    }
}
