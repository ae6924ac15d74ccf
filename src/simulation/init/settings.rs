use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::WorldError;
use crate::systems::geometry::DegeneracyPolicy;

use super::perf_stats::PerfStats;
use super::WorldCore;

/// Tunables for a world. Every field has a default, so partial JSON is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Seconds of simulated time per solver step
    pub fixed_step: f32,
    /// Upper bound on solver steps per `fixed_step` call
    pub max_steps: u32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub gravity: Vec2,
    pub degeneracy: DegeneracyPolicy,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_steps: 5,
            velocity_iterations: 8,
            position_iterations: 3,
            gravity: Vec2::new(0.0, -10.0),
            degeneracy: DegeneracyPolicy::Safe,
        }
    }
}

impl WorldSettings {
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let settings: WorldSettings =
            serde_json::from_str(json).map_err(|e| WorldError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return Err(WorldError::Settings(format!("fixed_step must be positive, got {}", self.fixed_step)));
        }
        if self.max_steps == 0 {
            return Err(WorldError::Settings("max_steps must be at least 1".into()));
        }
        if !self.gravity.is_finite() {
            return Err(WorldError::Settings("gravity must be finite".into()));
        }
        Ok(())
    }

    /// Largest time budget a single `fixed_step` call may carry.
    pub fn max_budget(&self) -> f32 {
        self.fixed_step * self.max_steps as f32
    }
}

pub(super) fn enable_perf_metrics(world: &mut WorldCore, enabled: bool) {
    world.perf_enabled = enabled;
    if !enabled {
        world.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(world: &WorldCore) -> PerfStats {
    world.perf_stats.clone()
}

pub(super) fn set_gravity(world: &mut WorldCore, x: f32, y: f32) {
    let gravity = Vec2::new(x, y);
    world.settings.gravity = gravity;
    world.solver.set_gravity(gravity);
}

pub(super) fn set_degeneracy_policy(world: &mut WorldCore, policy: DegeneracyPolicy) {
    world.settings.degeneracy = policy;
}
