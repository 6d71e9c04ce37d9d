//! Sample counts from tessellation tolerances.

use std::f64::consts::PI;

use tracing::debug;

use crate::TessellationParams;

/// Fewest sides a cross-section circle gets.
const MIN_ARC_SEGMENTS: usize = 6;

/// Most sides a cross-section circle gets. Finer tolerances are capped here.
pub const MAX_ARC_SEGMENTS: usize = 1024;

/// Most steps along one bend.
pub const MAX_BEND_STEPS: usize = 1024;

fn sides_for_deviation(deviation: f64, diameter: f64) -> Option<usize> {
    if deviation > 0.0 && 2.0 * deviation < diameter {
        let half_angle = (1.0 - 2.0 * deviation / diameter).acos();
        Some((PI / half_angle).ceil() as usize)
    } else {
        None
    }
}

/// Number of sides for every cross-section circle.
///
/// `max_diameter` is the largest outer diameter along the pipe and
/// `pipe_size` the diagonal of its bounds, which scales `rel`. Whichever
/// tolerance asks for the most sides wins, up to [`MAX_ARC_SEGMENTS`].
pub fn arc_segments(params: &TessellationParams, max_diameter: f64, pipe_size: f64) -> usize {
    let mut sides = MIN_ARC_SEGMENTS;
    if let Some(n) = sides_for_deviation(params.abs, max_diameter) {
        sides = sides.max(n);
    }
    if let Some(n) = sides_for_deviation(params.rel * pipe_size, max_diameter) {
        sides = sides.max(n);
    }
    if params.norm > 0.0 {
        sides = sides.max((PI / params.norm).ceil() as usize);
    }
    if sides > MAX_ARC_SEGMENTS {
        debug!(sides, max = MAX_ARC_SEGMENTS, "capping cross-section sides");
        sides = MAX_ARC_SEGMENTS;
    }
    sides
}

/// Number of steps along a bend sweeping `angle` radians.
///
/// Never fewer than one, and never coarser than the circle sampling so a
/// step spans at most one side's angle. Capped at [`MAX_BEND_STEPS`].
pub fn bend_steps(
    params: &TessellationParams,
    angle: f64,
    bend_radius: f64,
    outer_radius: f64,
    arc_segments: usize,
) -> usize {
    // Float-to-int casts saturate, so an infinite ratio lands on the cap below.
    let steps_for = |step_angle: f64| (angle / step_angle).ceil() as usize;

    let mut steps = 1;
    let reach = bend_radius + outer_radius;
    if params.abs > 0.0 && params.abs < reach {
        steps = steps.max(steps_for(2.0 * (1.0 - params.abs / reach).acos()));
    }
    if params.rel > 0.0 && params.rel < 1.0 {
        steps = steps.max(steps_for(2.0 * (1.0 - params.rel).acos()));
    }
    if params.norm > 0.0 {
        steps = steps.max(steps_for(2.0 * params.norm));
    }
    steps = steps.max(steps_for(2.0 * PI / arc_segments as f64));
    if steps > MAX_BEND_STEPS {
        debug!(steps, max = MAX_BEND_STEPS, "capping bend steps");
        steps = MAX_BEND_STEPS;
    }
    steps
}
