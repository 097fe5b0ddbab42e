use crate::dom;
use crate::input::{self, DragState, PinchTracker};
use crate::listener::EventListener;
use case_core::{OrbitAction, ViewerSession};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

type Drag = Rc<RefCell<DragState<OrbitAction>>>;
type Touches = Rc<RefCell<PinchTracker>>;

#[inline]
fn is_touch(ev: &web::PointerEvent) -> bool {
    ev.pointer_type() == "touch"
}

/// Pointer drag (rotate, pan, dolly), two-finger pinch and wheel zoom on the
/// canvas.
pub fn wire_orbit_input(
    canvas: &web::HtmlCanvasElement,
    session: &Rc<RefCell<ViewerSession>>,
) -> anyhow::Result<Vec<EventListener>> {
    // Touch gestures go to the viewer, not to page scrolling or zooming.
    canvas
        .style()
        .set_property("touch-action", "none")
        .map_err(|e| anyhow::anyhow!("touch-action: {:?}", e))?;

    let drag: Drag = Rc::new(RefCell::new(DragState::default()));
    let touches: Touches = Rc::new(RefCell::new(PinchTracker::default()));
    Ok(vec![
        wire_pointerdown(canvas, &drag, &touches)?,
        wire_pointermove(canvas, session, &drag, &touches)?,
        wire_pointerup(canvas, &drag, &touches, "pointerup")?,
        wire_pointerup(canvas, &drag, &touches, "pointercancel")?,
        wire_wheel(canvas, session)?,
        wire_contextmenu(canvas)?,
    ])
}

fn wire_pointerdown(
    canvas: &web::HtmlCanvasElement,
    drag: &Drag,
    touches: &Touches,
) -> anyhow::Result<EventListener> {
    let target = canvas.clone();
    let drag = drag.clone();
    let touches = touches.clone();
    EventListener::new(canvas.as_ref(), "pointerdown", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let pan_modifier = ev.shift_key() || ev.ctrl_key() || ev.meta_key();
        let Some(action) = OrbitAction::for_button(ev.button(), pan_modifier) else {
            return;
        };
        ev.prevent_default();
        _ = target.set_pointer_capture(ev.pointer_id());
        let at = dom::pointer_canvas_px(ev, &target);
        if is_touch(ev) && touches.borrow_mut().press(ev.pointer_id(), at) == 2 {
            drag.borrow_mut().cancel();
            return;
        }
        drag.borrow_mut().begin(action, ev.pointer_id(), at);
    })
}

fn wire_pointermove(
    canvas: &web::HtmlCanvasElement,
    session: &Rc<RefCell<ViewerSession>>,
    drag: &Drag,
    touches: &Touches,
) -> anyhow::Result<EventListener> {
    let target = canvas.clone();
    let session = session.clone();
    let drag = drag.clone();
    let touches = touches.clone();
    EventListener::new(canvas.as_ref(), "pointermove", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let at = dom::pointer_canvas_px(ev, &target);
        if is_touch(ev) {
            let pinch = touches.borrow_mut().motion(ev.pointer_id(), at);
            if let Some(p) = pinch {
                session.borrow_mut().pinch(p.scale, p.pan.x, p.pan.y);
                return;
            }
        }
        let step = drag.borrow_mut().advance(ev.pointer_id(), at);
        if let Some((action, delta)) = step {
            session.borrow_mut().drag(action, delta.x, delta.y);
        }
    })
}

fn wire_pointerup(
    canvas: &web::HtmlCanvasElement,
    drag: &Drag,
    touches: &Touches,
    kind: &'static str,
) -> anyhow::Result<EventListener> {
    let target = canvas.clone();
    let drag = drag.clone();
    let touches = touches.clone();
    EventListener::new(canvas.as_ref(), kind, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        _ = target.release_pointer_capture(ev.pointer_id());
        drag.borrow_mut().end(ev.pointer_id());
        if !is_touch(ev) {
            return;
        }
        // Lifting one finger of a pinch hands the gesture back to rotation.
        let remaining = touches.borrow_mut().release(ev.pointer_id());
        if let Some((id, at)) = remaining {
            drag.borrow_mut().begin(OrbitAction::Rotate, id, at);
        }
    })
}

fn wire_wheel(
    canvas: &web::HtmlCanvasElement,
    session: &Rc<RefCell<ViewerSession>>,
) -> anyhow::Result<EventListener> {
    let session = session.clone();
    EventListener::new(canvas.as_ref(), "wheel", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
            return;
        };
        ev.prevent_default();
        let dy = input::wheel_delta_px(ev.delta_y(), ev.delta_mode());
        session.borrow_mut().zoom(dy);
    })
}

// Right-drag pans, so the browser menu stays closed over the canvas.
fn wire_contextmenu(canvas: &web::HtmlCanvasElement) -> anyhow::Result<EventListener> {
    EventListener::new(canvas.as_ref(), "contextmenu", |ev| ev.prevent_default())
}
