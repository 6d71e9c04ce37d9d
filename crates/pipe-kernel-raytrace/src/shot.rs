//! The per-ray entry point.

use pipe_kernel_geom::{PreppedPipe, Segment};
use tracing::warn;

use crate::assemble::assemble;
use crate::diagnostics::Diagnostics;
use crate::hits::ShotOutcome;
use crate::intersect::{
    has_radius_change, intersect_bend, intersect_end_cap, intersect_linear,
    intersect_radius_change, intersect_start_cap,
};
use crate::scratch::Scratch;
use crate::Ray;

/// Intersect `ray` with `pipe`.
///
/// Gathers candidates from every segment wall, the two end caps and any
/// radius steps between segments, then assembles them into spans. Only
/// reads `pipe`, so any number of threads may shoot at it at once, each
/// with its own `scratch`.
pub fn shot(
    pipe: &PreppedPipe,
    ray: &Ray,
    scratch: &mut Scratch,
    diagnostics: &Diagnostics,
) -> ShotOutcome {
    scratch.clear();
    if pipe
        .bounds
        .intersect_line(&ray.origin, ray.direction.as_ref())
        .is_none()
    {
        return ShotOutcome::Miss;
    }

    let segments = &pipe.segments;
    if let Some(first) = segments.first() {
        intersect_start_cap(ray, first, scratch);
    }

    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Linear(seg) => intersect_linear(ray, seg, index, scratch),
            Segment::Bend(bend) => intersect_bend(ray, bend, index, scratch, diagnostics),
        }
        if let Some(next) = segments.get(index + 1) {
            if has_radius_change(segment, next) {
                intersect_radius_change(ray, segment, next, index, scratch);
            }
        }
    }

    if let Some(last) = segments.last() {
        intersect_end_cap(ray, last, segments.len() - 1, scratch);
    }

    if scratch.dropped() > 0 {
        warn!(
            limit = crate::scratch::MAX_CANDIDATES,
            dropped = scratch.dropped(),
            origin = ?ray.origin,
            direction = ?ray.direction.as_ref(),
            "too many candidate hits, spans past the limit are lost"
        );
    }

    assemble(pipe, ray, scratch.candidates_mut())
}
