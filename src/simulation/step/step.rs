use log::warn;

use super::{find_entity, PerfTimer, WorldCore};

/// Slack when the budget is an exact multiple of the step, absorbing f32 drift.
const STEP_EPSILON: f32 = 1e-4;

pub(super) fn fixed_step(world: &mut WorldCore, delta_time: f32) -> bool {
    let perf_on = world.perf_enabled;
    if perf_on {
        world.perf_stats.reset();
    }
    let step_start = PerfTimer::start_if(perf_on);

    let step = world.settings.fixed_step;
    let max_budget = world.settings.max_budget();

    if delta_time.is_finite() && delta_time > 0.0 {
        world.accumulator += delta_time;
    }
    if world.accumulator > max_budget {
        warn!(
            "fixed_step: dropping {:.4}s of simulated time (budget capped at {} steps)",
            world.accumulator - max_budget,
            world.settings.max_steps
        );
        world.accumulator = max_budget;
    }

    let due = ((world.accumulator / step) + STEP_EPSILON).floor() as u32;
    let due = due.min(world.settings.max_steps);

    for i in 0..due {
        if i + 1 == due {
            store_previous_states(world);
        }
        advance_once(world, perf_on);
        world.accumulator = (world.accumulator - step).max(0.0);
    }

    let remainder = world.accumulator.min(step);
    let factor = (1.0 - remainder / step).clamp(0.0, 1.0);

    let t0 = PerfTimer::start_if(perf_on);
    interpolate_all(world, factor);
    if let Some(t0) = t0 {
        world.perf_stats.interpolate_ms = t0.elapsed_ms();
    }

    if let Some(start) = step_start {
        world.perf_stats.steps = due;
        world.perf_stats.entities = world.entities.len() as u32;
        world.perf_stats.step_ms = start.elapsed_ms();
    }

    due > 0
}

fn store_previous_states(world: &mut WorldCore) {
    for entity in world.entities.iter_mut() {
        entity.store_previous_state(&world.solver);
    }
}

/// One solver step, then contact and post-step dispatch.
fn advance_once(world: &mut WorldCore, perf_on: bool) {
    let mut contacts = std::mem::take(&mut world.contacts);
    contacts.clear();

    let t0 = PerfTimer::start_if(perf_on);
    world.solver.advance(world.settings.fixed_step, &mut contacts);
    if let Some(t0) = t0 {
        world.perf_stats.solver_ms += t0.elapsed_ms();
        world.perf_stats.contacts += contacts.len() as u32;
    }

    for &(a, b) in contacts.iter() {
        let (Some(ea), Some(eb)) = (
            find_entity(&world.entities, a),
            find_entity(&world.entities, b),
        ) else {
            continue;
        };
        if ea.has_body() && eb.has_body() {
            world.listeners.contact_began(ea, eb);
        }
    }
    world.contacts = contacts;

    world.step_count += 1;
    world.listeners.post_step(world.step_count);
}

/// Blend every entity between its snapshot and the latest solver state.
///
/// `factor` weighs the previous snapshot: the rendered value is
/// `previous * factor + current * (1 - factor)`.
pub(super) fn interpolate_all(world: &mut WorldCore, factor: f32) {
    let alpha = 1.0 - factor;
    for entity in world.entities.iter_mut() {
        entity.interpolate(&world.solver, alpha);
    }
}
