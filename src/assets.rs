use crate::constants::ASSET_BASE_URL;
use crate::input::asset_url;
use case_core::{decode_texture, load_scene_glb, ViewerSession};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn fetch_bytes(request: js_sys::Promise, url: &str) -> anyhow::Result<Vec<u8>> {
    let resp = JsFuture::from(request)
        .await
        .map_err(|e| anyhow::anyhow!("fetch {} failed: {:?}", url, e))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("fetch {} returned {:?}", url, e))?;
    if !resp.ok() {
        anyhow::bail!("fetch {} returned HTTP {}", url, resp.status());
    }
    let buf = resp
        .array_buffer()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let buf = JsFuture::from(buf)
        .await
        .map_err(|e| anyhow::anyhow!("reading {} failed: {:?}", url, e))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Fetch the model and the texture concurrently and hand each to the session
/// as it arrives. Results landing after unmount are dropped. A failed asset
/// is logged and the canvas keeps showing the background.
pub async fn load_assets(
    window: web::Window,
    session: Rc<RefCell<ViewerSession>>,
    mounted: Rc<Cell<bool>>,
) {
    let (model_path, texture_path, flip_y) = {
        let s = session.borrow();
        let c = s.config();
        (c.model_path.clone(), c.texture_path.clone(), c.flip_texture_y)
    };
    let model_url = asset_url(ASSET_BASE_URL, &model_path);
    let texture_url = asset_url(ASSET_BASE_URL, &texture_path);
    log::info!("[assets] fetching {} and {}", model_url, texture_url);

    // Both requests are in flight before either is awaited.
    let model_req = window.fetch_with_str(&model_url);
    let texture_req = window.fetch_with_str(&texture_url);

    let scene = fetch_bytes(model_req, &model_url)
        .await
        .and_then(|bytes| load_scene_glb(&bytes).map_err(anyhow::Error::from));
    if !mounted.get() {
        return;
    }
    match scene {
        Ok(scene) => session.borrow_mut().on_model_loaded(scene),
        Err(e) => log::error!("[assets] model load failed: {:?}", e),
    }

    let texture = fetch_bytes(texture_req, &texture_url)
        .await
        .and_then(|bytes| decode_texture(&bytes, flip_y).map_err(anyhow::Error::from));
    if !mounted.get() {
        return;
    }
    match texture {
        Ok(image) => session.borrow_mut().on_texture_loaded(image),
        Err(e) => log::error!("[assets] texture load failed: {:?}", e),
    }
}
