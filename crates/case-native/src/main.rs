use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::keyboard::ModifiersState;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use case_core::{decode_texture, load_scene_glb, OrbitAction, ViewerConfig, ViewerSession};
use case_render::{FrameView, GpuState};

const ASSET_DIR: &str = "assets";
// Browsers report roughly this many pixels per wheel notch
const WHEEL_LINE_PX: f32 = 100.0;

#[derive(Default)]
struct PointerState {
    action: Option<OrbitAction>,
    last: Option<PhysicalPosition<f64>>,
    modifiers: ModifiersState,
}

fn button_index(button: MouseButton) -> Option<i16> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Middle => Some(1),
        MouseButton::Right => Some(2),
        _ => None,
    }
}

fn asset_path(relative: &str) -> PathBuf {
    Path::new(ASSET_DIR).join(relative.trim_start_matches('/'))
}

fn load_assets(session: &mut ViewerSession) {
    let config = session.config().clone();

    let model = asset_path(&config.model_path);
    let scene = std::fs::read(&model)
        .with_context(|| format!("reading {}", model.display()))
        .and_then(|bytes| load_scene_glb(&bytes).map_err(anyhow::Error::from));
    match scene {
        Ok(scene) => session.on_model_loaded(scene),
        Err(e) => log::error!("[assets] model load failed: {:?}", e),
    }

    let texture = asset_path(&config.texture_path);
    let image = std::fs::read(&texture)
        .with_context(|| format!("reading {}", texture.display()))
        .and_then(|bytes| {
            decode_texture(&bytes, config.flip_texture_y).map_err(anyhow::Error::from)
        });
    match image {
        Ok(image) => session.on_texture_loaded(image),
        Err(e) => log::error!("[assets] texture load failed: {:?}", e),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Phone Case Viewer (native)")
            .with_inner_size(LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)?,
    );
    let size = window.inner_size();
    let logical_width = size.to_logical::<f64>(window.scale_factor()).width;

    let config = ViewerConfig::default();
    let clear = config.clear_color_linear;
    let mut session = ViewerSession::new(config, logical_width, size.width, size.height);

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let mut gpu = pollster::block_on(GpuState::new(
        &instance,
        surface,
        size.width,
        size.height,
        clear,
    ))?;

    load_assets(&mut session);

    let mut pointer = PointerState::default();
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                gpu.resize_if_needed(size.width, size.height);
                session.set_surface_size(size.width, size.height);
                session.on_resize(size.to_logical::<f64>(window.scale_factor()).width);
            }
            WindowEvent::ModifiersChanged(m) => pointer.modifiers = m.state(),
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    let pan_mod = pointer.modifiers.shift_key()
                        || pointer.modifiers.control_key()
                        || pointer.modifiers.super_key();
                    pointer.action = button_index(button)
                        .and_then(|b| OrbitAction::for_button(b, pan_mod));
                }
                ElementState::Released => {
                    pointer.action = None;
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(action), Some(last)) = (pointer.action, pointer.last) {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    session.drag(action, dx, dy);
                }
                pointer.last = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                pointer.action = None;
                pointer.last = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                session.zoom(dy);
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;
            session.tick(dt);
            if let Some(scene) = session.ready_scene_mut() {
                gpu.upload_scene(scene);
                gpu.sync_materials(scene);
            }
            let view = FrameView {
                view_proj: session.camera().view_projection(),
                model: session.model_matrix(),
                lighting: &session.config().lighting,
            };
            match gpu.render(&view) {
                Ok(_) => window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[gpu] out of memory");
                    elwt.exit();
                }
                Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}
