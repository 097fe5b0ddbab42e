//! Auto-fit: normalize a model's visual size from its bounding diagonal, then
//! shrink it on narrower viewports.

use crate::bounds::Aabb;
use crate::constants::FIT_TARGET_SIZE;
use crate::scene::{SceneGraph, SceneId};
use crate::viewport::ViewportTier;

/// Bounding diagonal of a measured object. Always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitMetric(f32);

impl FitMetric {
    pub const DEFAULT: FitMetric = FitMetric(1.0);

    /// Substitutes 1 for zero, negative and non-finite lengths.
    pub fn from_diagonal(diagonal: f32) -> Self {
        if diagonal.is_finite() && diagonal > 0.0 {
            FitMetric(diagonal)
        } else {
            Self::DEFAULT
        }
    }

    pub fn from_bounds(bounds: Option<&Aabb>) -> Self {
        match bounds {
            Some(b) => Self::from_diagonal(b.diagonal()),
            None => Self::DEFAULT,
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for FitMetric {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[inline]
pub fn base_scale(target: f32, metric: FitMetric) -> f32 {
    target / metric.value()
}

#[inline]
pub fn render_scale(target: f32, metric: FitMetric, tier: ViewportTier) -> f32 {
    base_scale(target, metric) * tier.damping()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FitState {
    Unloaded,
    LoadedUnmeasured { scene: SceneId },
    Measured { scene: SceneId, metric: FitMetric },
}

/// Tracks the measurement lifecycle of the current asset instance.
#[derive(Clone, Debug)]
pub struct AutoFitScaler {
    target: f32,
    state: FitState,
}

impl Default for AutoFitScaler {
    fn default() -> Self {
        Self::new(FIT_TARGET_SIZE)
    }
}

impl AutoFitScaler {
    pub fn new(target: f32) -> Self {
        Self {
            target,
            state: FitState::Unloaded,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    /// A new asset instance restarts the sequence; the same instance is a no-op.
    pub fn on_loaded(&mut self, scene: &SceneGraph) {
        let id = scene.id();
        match self.state {
            FitState::LoadedUnmeasured { scene: current }
            | FitState::Measured { scene: current, .. }
                if current == id => {}
            _ => self.state = FitState::LoadedUnmeasured { scene: id },
        }
    }

    /// Measure once per asset instance and return the metric.
    pub fn measure(&mut self, scene: &SceneGraph) -> FitMetric {
        self.on_loaded(scene);
        match self.state {
            FitState::Measured { metric, .. } => metric,
            _ => {
                let bounds = scene.bounds();
                let metric = if bounds.is_empty() {
                    FitMetric::DEFAULT
                } else {
                    FitMetric::from_bounds(Some(&bounds))
                };
                log::info!(
                    "[fit] scene {:?} diagonal={:.4} metric={:.4}",
                    scene.id(),
                    bounds.diagonal(),
                    metric.value()
                );
                self.state = FitState::Measured {
                    scene: scene.id(),
                    metric,
                };
                metric
            }
        }
    }

    pub fn metric(&self) -> FitMetric {
        match self.state {
            FitState::Measured { metric, .. } => metric,
            _ => FitMetric::DEFAULT,
        }
    }

    /// Uniform scale for the current tier. Before measurement the default
    /// metric applies.
    pub fn render_scale(&self, tier: ViewportTier) -> f32 {
        render_scale(self.target, self.metric(), tier)
    }

    pub fn unload(&mut self) {
        self.state = FitState::Unloaded;
    }
}
