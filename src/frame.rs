use crate::callback_slot::CallbackSlot;
use crate::constants::MAX_FRAME_DT_SEC;
use crate::dom;
use case_core::ViewerSession;
use case_render::{FrameView, GpuState};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub struct FrameContext<'a> {
    pub session: Rc<RefCell<ViewerSession>>,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<GpuState<'a>>,
    pub running: Rc<Cell<bool>>,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant)
            .as_secs_f32()
            .min(MAX_FRAME_DT_SEC);
        self.last_instant = now;

        let mut session = self.session.borrow_mut();
        session.tick(dt_sec);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (w_px, h_px) = (self.canvas.width(), self.canvas.height());
        if (w_px, h_px) != gpu.size() {
            gpu.resize_if_needed(w_px, h_px);
            session.set_surface_size(w_px, h_px);
        }

        match session.ready_scene_mut() {
            Some(scene) => {
                gpu.upload_scene(scene);
                gpu.sync_materials(scene);
            }
            None => {
                if gpu.has_model() {
                    gpu.clear_model();
                }
            }
        }

        let view = FrameView {
            view_proj: session.camera().view_projection(),
            model: session.model_matrix(),
            lighting: &session.config().lighting,
        };
        match gpu.render(&view) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("[gpu] out of memory, stopping render loop");
                self.running.set(false);
            }
            Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
        }
    }

    // Frees GPU resources once the loop has stopped.
    fn shutdown(&mut self) {
        if self.gpu.take().is_some() {
            log::info!("[gpu] released");
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    clear_linear: [f32; 3],
) -> Option<GpuState<'static>> {
    let (w_px, h_px) = dom::sync_canvas_backing_size(canvas);
    let instance = wgpu::Instance::default();
    let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
        Ok(s) => s,
        Err(e) => {
            log::error!("WebGPU surface error: {:?}", e);
            return None;
        }
    };
    match GpuState::new(&instance, surface, w_px, h_px, clear_linear).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

/// Drive `frame` from requestAnimationFrame until `running` is cleared.
/// Once stopped, the callback (and with it the frame context) is freed on the
/// next microtask.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let slot: CallbackSlot<Closure<dyn FnMut()>> = CallbackSlot::default();
    let slot_tick = slot.clone();
    slot.fill(Closure::wrap(Box::new(move || {
        let mut ctx = frame_ctx.borrow_mut();
        if !ctx.running.get() {
            ctx.shutdown();
            let slot = slot_tick.clone();
            spawn_local(async move {
                if slot.release().is_some() {
                    log::debug!("[gpu] frame loop released");
                }
            });
            return;
        }
        ctx.frame();
        drop(ctx);
        request_frame(&slot_tick);
    }) as Box<dyn FnMut()>));
    request_frame(&slot);
}

fn request_frame(slot: &CallbackSlot<Closure<dyn FnMut()>>) {
    let Some(w) = web::window() else {
        return;
    };
    slot.with(|cb| {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    });
}
