#![cfg(target_arch = "wasm32")]
use case_core::{ViewerConfig, ViewerSession};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod callback_slot;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod listener;

use constants::{CANVAS_ID, MODEL_ATTR, TEXTURE_ATTR};
use listener::EventListener;

/// Everything a mounted viewer owns on the page. Dropping it detaches the
/// listeners; clearing `running` stops the frame loop and any pending load.
struct Mounted {
    running: Rc<Cell<bool>>,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("case-viewer starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

/// Detach the viewer: remove its listeners, stop rendering and drop any
/// asset that has not arrived yet.
#[wasm_bindgen]
pub fn unmount() {
    let Some(mounted) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        log::debug!("unmount: viewer not mounted");
        return;
    };
    mounted.running.set(false);
    drop(mounted);
    log::info!("case-viewer unmounted");
}

fn config_for(canvas: &web::HtmlCanvasElement) -> ViewerConfig {
    let mut config = ViewerConfig::default();
    if let Some(path) = dom::data_attribute(canvas, MODEL_ATTR) {
        config = config.with_model_path(path);
    }
    if let Some(path) = dom::data_attribute(canvas, TEXTURE_ATTR) {
        config = config.with_texture_path(path);
    }
    config
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    if MOUNTED.with(|m| m.borrow().is_some()) {
        log::warn!("viewer already mounted");
        return Ok(());
    }

    let config = config_for(&canvas);
    let clear = config.clear_color_linear;
    let (w_px, h_px) = dom::sync_canvas_backing_size(&canvas);
    let session = Rc::new(RefCell::new(ViewerSession::new(
        config,
        dom::viewport_width(),
        w_px,
        h_px,
    )));
    let running = Rc::new(Cell::new(true));

    let mut listeners = events::wire_orbit_input(&canvas, &session)?;
    listeners.push(events::wire_resize(&window, &canvas, &session)?);
    MOUNTED.with(|m| {
        *m.borrow_mut() = Some(Mounted {
            running: running.clone(),
            _listeners: listeners,
        })
    });

    spawn_local(assets::load_assets(
        window.clone(),
        session.clone(),
        running.clone(),
    ));

    let gpu = frame::init_gpu(&canvas, clear).await;
    if !running.get() {
        return Ok(());
    }
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session,
        canvas,
        gpu,
        running,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
