//! Responsive viewport tiers.
//!
//! The host reports its width (CSS pixels) into a [`ViewportState`]; the tier
//! derived from it drives both the camera depth and the auto-fit damping.

use crate::constants::*;
use glam::Vec3;

/// Discrete responsive bucket derived from viewport width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportTier {
    Wide,
    Medium,
    Narrow,
}

impl ViewportTier {
    /// Classify a width. Anything not strictly above a threshold (including
    /// zero, negative and NaN widths) falls through to the narrower tier.
    pub fn from_width(width: f64) -> Self {
        if width > WIDE_MIN_WIDTH_EXCLUSIVE {
            ViewportTier::Wide
        } else if width > MEDIUM_MIN_WIDTH_EXCLUSIVE {
            ViewportTier::Medium
        } else {
            ViewportTier::Narrow
        }
    }

    /// Multiplier applied to the auto-fit scale.
    pub fn damping(self) -> f32 {
        match self {
            ViewportTier::Wide => DAMPING_WIDE,
            ViewportTier::Medium => DAMPING_MEDIUM,
            ViewportTier::Narrow => DAMPING_NARROW,
        }
    }

    /// Camera depth. Only two buckets: Wide and Medium share the near depth.
    pub fn camera_distance(self) -> f32 {
        match self {
            ViewportTier::Wide | ViewportTier::Medium => CAMERA_Z_NEAR,
            ViewportTier::Narrow => CAMERA_Z_FAR,
        }
    }

    pub fn camera_position(self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.camera_distance())
    }
}

/// Result of feeding a new width into [`ViewportState::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportUpdate {
    pub tier: ViewportTier,
    pub previous: ViewportTier,
    pub camera_position: Vec3,
}

impl ViewportUpdate {
    pub fn tier_changed(&self) -> bool {
        self.tier != self.previous
    }
}

/// Observable viewport width. Owned by the frontend and handed by reference
/// to whatever needs the tier; there is no global copy.
#[derive(Clone, Debug)]
pub struct ViewportState {
    width: f64,
    tier: ViewportTier,
    revision: u64,
}

impl ViewportState {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            tier: ViewportTier::from_width(width),
            revision: 0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn tier(&self) -> ViewportTier {
        self.tier
    }

    /// Bumped on every update, including ones that keep the same tier.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record a new width. Always yields the camera position to apply, since
    /// every resize re-places the camera.
    pub fn update(&mut self, width: f64) -> ViewportUpdate {
        let previous = self.tier;
        self.width = width;
        self.tier = ViewportTier::from_width(width);
        self.revision = self.revision.wrapping_add(1);
        if self.tier != previous {
            log::info!(
                "[viewport] width={:.0} tier {:?} -> {:?}",
                width,
                previous,
                self.tier
            );
        }
        ViewportUpdate {
            tier: self.tier,
            previous,
            camera_position: self.tier.camera_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive_on_the_wide_side() {
        assert_eq!(ViewportTier::from_width(1201.0), ViewportTier::Wide);
        assert_eq!(ViewportTier::from_width(1200.0), ViewportTier::Medium);
        assert_eq!(ViewportTier::from_width(769.0), ViewportTier::Medium);
        assert_eq!(ViewportTier::from_width(768.0), ViewportTier::Narrow);
    }

    #[test]
    fn odd_widths_are_narrow() {
        assert_eq!(ViewportTier::from_width(0.0), ViewportTier::Narrow);
        assert_eq!(ViewportTier::from_width(-50.0), ViewportTier::Narrow);
        assert_eq!(ViewportTier::from_width(f64::NAN), ViewportTier::Narrow);
    }

    #[test]
    fn update_reports_previous_tier() {
        let mut vp = ViewportState::new(1440.0);
        let up = vp.update(500.0);
        assert_eq!(up.previous, ViewportTier::Wide);
        assert_eq!(up.tier, ViewportTier::Narrow);
        assert!(up.tier_changed());
        assert_eq!(up.camera_position, Vec3::new(0.0, 0.0, CAMERA_Z_FAR));
        let again = vp.update(400.0);
        assert!(!again.tier_changed());
        assert_eq!(vp.revision(), 2);
    }
}
