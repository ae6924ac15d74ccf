use crate::systems::geometry::{Decompose, EarClipper, PolygonRepair, SimplifyPolygon};
use crate::systems::solver::Solver;

use super::listeners::Listeners;
use super::perf_stats::PerfStats;
use super::settings::WorldSettings;
use super::WorldCore;

pub(super) fn create_world_core(
    settings: WorldSettings,
    repair: Box<dyn PolygonRepair>,
    decomposer: Box<dyn Decompose>,
) -> WorldCore {
    let solver = Solver::new(
        settings.gravity,
        settings.velocity_iterations,
        settings.position_iterations,
    );

    WorldCore {
        settings,
        solver,
        entities: Vec::new(),
        next_id: 1,
        accumulator: 0.0,
        step_count: 0,
        joint_anchor: None,
        listeners: Listeners::default(),
        repair,
        decomposer,
        contacts: Vec::with_capacity(64),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}

pub(super) fn default_services() -> (Box<dyn PolygonRepair>, Box<dyn Decompose>) {
    (Box::new(SimplifyPolygon::default()), Box::new(EarClipper))
}
