use glam::Vec2;

/// Active pointer drag: which control it drives and where it was last seen
/// (canvas backing-store pixels).
#[derive(Clone, Copy, Debug)]
pub struct DragState<A: Copy> {
    pub action: Option<A>,
    pub pointer_id: i32,
    pub last: Vec2,
}

impl<A: Copy> Default for DragState<A> {
    fn default() -> Self {
        Self {
            action: None,
            pointer_id: 0,
            last: Vec2::ZERO,
        }
    }
}

impl<A: Copy> DragState<A> {
    pub fn begin(&mut self, action: A, pointer_id: i32, at: Vec2) {
        self.action = Some(action);
        self.pointer_id = pointer_id;
        self.last = at;
    }

    /// Delta since the previous position for the pointer that started the
    /// drag; other pointers are ignored.
    pub fn advance(&mut self, pointer_id: i32, at: Vec2) -> Option<(A, Vec2)> {
        let action = self.action?;
        if pointer_id != self.pointer_id {
            return None;
        }
        let delta = at - self.last;
        self.last = at;
        Some((action, delta))
    }

    pub fn end(&mut self, pointer_id: i32) -> bool {
        if self.action.is_some() && pointer_id == self.pointer_id {
            self.action = None;
            true
        } else {
            false
        }
    }

    /// Abandon the drag whichever pointer owns it.
    pub fn cancel(&mut self) {
        self.action = None;
    }
}

/// One step of a two-finger gesture: distance factor for the orbit radius
/// (below 1 when the fingers spread) and midpoint motion in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchStep {
    pub scale: f32,
    pub pan: Vec2,
}

/// Active touch points, at most two. With two down, moves become pinch steps.
#[derive(Clone, Debug, Default)]
pub struct PinchTracker {
    points: Vec<(i32, Vec2)>,
}

impl PinchTracker {
    /// Register a touch. A third finger is ignored. Returns the number of
    /// tracked touches.
    pub fn press(&mut self, pointer_id: i32, at: Vec2) -> usize {
        if let Some(p) = self.points.iter_mut().find(|p| p.0 == pointer_id) {
            p.1 = at;
        } else if self.points.len() < 2 {
            self.points.push((pointer_id, at));
        }
        self.points.len()
    }

    pub fn is_pinching(&self) -> bool {
        self.points.len() == 2
    }

    pub fn motion(&mut self, pointer_id: i32, at: Vec2) -> Option<PinchStep> {
        let idx = self.points.iter().position(|p| p.0 == pointer_id)?;
        if !self.is_pinching() {
            self.points[idx].1 = at;
            return None;
        }
        let (a0, b0) = (self.points[0].1, self.points[1].1);
        self.points[idx].1 = at;
        let (a1, b1) = (self.points[0].1, self.points[1].1);

        let before = a0.distance(b0);
        let after = a1.distance(b1);
        let scale = if before > 1e-3 && after > 1e-3 {
            before / after
        } else {
            1.0
        };
        Some(PinchStep {
            scale,
            pan: (a1 + b1) * 0.5 - (a0 + b0) * 0.5,
        })
    }

    /// Forget a touch. When this ends a pinch, the finger still down is
    /// returned so a single-finger drag can resume from it.
    pub fn release(&mut self, pointer_id: i32) -> Option<(i32, Vec2)> {
        let idx = self.points.iter().position(|p| p.0 == pointer_id)?;
        let was_pinching = self.is_pinching();
        self.points.remove(idx);
        if was_pinching {
            self.points.first().copied()
        } else {
            None
        }
    }
}

/// Map client (CSS) coordinates to canvas backing-store pixels given the
/// canvas' bounding rect and backing size.
#[inline]
pub fn client_to_canvas_px(
    client: Vec2,
    rect_origin: Vec2,
    rect_size: Vec2,
    backing_size: Vec2,
) -> Vec2 {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return Vec2::ZERO;
    }
    (client - rect_origin) / rect_size * backing_size
}

/// Normalize `WheelEvent.deltaY` to pixels according to `deltaMode`
/// (0 pixel, 1 line, 2 page).
#[inline]
pub fn wheel_delta_px(delta_y: f64, delta_mode: u32) -> f32 {
    let d = delta_y as f32;
    match delta_mode {
        1 => d * crate::constants::WHEEL_DELTA_LINE_PX,
        2 => d * crate::constants::WHEEL_DELTA_PAGE_PX,
        _ => d,
    }
}

/// Backing-store size for a CSS box at a device pixel ratio, never zero.
#[inline]
pub fn backing_size(css_w: f64, css_h: f64, dpr: f64) -> (u32, u32) {
    let w = (css_w * dpr).max(0.0) as u32;
    let h = (css_h * dpr).max(0.0) as u32;
    (w.max(1), h.max(1))
}

/// Join the asset base URL and a relative path with exactly one slash.
/// Absolute URLs and root-relative paths pass through.
pub fn asset_url(base: &str, path: &str) -> String {
    if path.starts_with('/') || path.contains("://") {
        return path.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}
