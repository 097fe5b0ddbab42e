use crate::dom;
use crate::listener::EventListener;
use case_core::ViewerSession;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Keep the canvas backing store and the viewport tier in step with
/// `window` resizes.
pub fn wire_resize(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    session: &Rc<RefCell<ViewerSession>>,
) -> anyhow::Result<EventListener> {
    let canvas = canvas.clone();
    let session = session.clone();
    EventListener::new(window.as_ref(), "resize", move |_ev| {
        let (w_px, h_px) = dom::sync_canvas_backing_size(&canvas);
        let mut s = session.borrow_mut();
        s.set_surface_size(w_px, h_px);
        let update = s.on_resize(dom::viewport_width());
        if update.tier_changed() {
            log::debug!(
                "[events] resize moved camera to z={:.2}",
                update.camera_position.z
            );
        }
    })
}
