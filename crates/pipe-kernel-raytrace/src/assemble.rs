//! Turning candidate hits into entry/exit spans.

use pipe_kernel_geom::PreppedPipe;
use tracing::{debug, warn};

use crate::hits::{CandidateHit, Hit, HitSpan, Inconsistency, ShotOutcome};
use crate::normal::surface_normal;
use crate::Ray;

/// Adjacent hits on the same surface closer than this are a graze.
pub const DEDUP_DISTANCE: f64 = 1e-5;

/// Sort, de-duplicate and pair `candidates` into spans.
///
/// 1. Sort by distance.
/// 2. Drop both hits of any adjacent pair closer than [`DEDUP_DISTANCE`] on
///    the same surface of the same segment.
/// 3. Zero or one hit left is a miss.
/// 4. A nearest hit whose normal runs with the ray is rejected.
/// 5. Runs of same-facing hits, which appear where a pipe overlaps itself,
///    are pruned to the first entry and the last exit.
/// 6. An odd count left is rejected; otherwise hits pair up in order.
///
/// Step 5 is a repair for self-overlapping pipes, not an exact answer.
pub fn assemble(pipe: &PreppedPipe, ray: &Ray, candidates: &mut [CandidateHit]) -> ShotOutcome {
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut kept: Vec<&CandidateHit> = Vec::with_capacity(candidates.len());
    let mut i = 0;
    while i < candidates.len() {
        let here = &candidates[i];
        if let Some(next) = candidates.get(i + 1) {
            if next.distance - here.distance < DEDUP_DISTANCE
                && next.segment == here.segment
                && next.surface == here.surface
            {
                debug!(distance = here.distance, surface = ?here.surface, "dropping grazing pair");
                i += 2;
                continue;
            }
        }
        kept.push(here);
        i += 1;
    }

    if kept.len() < 2 {
        if !kept.is_empty() {
            debug!("single hit left, treating as miss");
        }
        return ShotOutcome::Miss;
    }

    let hits: Vec<Hit> = kept
        .into_iter()
        .map(|c| Hit {
            distance: c.distance,
            point: ray.at(c.distance),
            normal: surface_normal(&pipe.segments[c.segment], c),
            segment: c.segment,
            surface: c.surface,
        })
        .collect();

    let entering = |hit: &Hit| hit.normal.dot(ray.direction.as_ref()) < 0.0;

    if !entering(&hits[0]) {
        warn!(
            origin = ?ray.origin,
            direction = ?ray.direction.as_ref(),
            distance = hits[0].distance,
            "first hit is an exit, pipe may overlap itself"
        );
        return ShotOutcome::Inconsistent(Inconsistency::FirstHitExits);
    }

    let mut ordered: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        match ordered.last_mut() {
            Some(last) if entering(&*last) == entering(&hit) => {
                debug!(distance = hit.distance, "pruning overlapping hit");
                // Keep the first entry and the last exit of a run.
                if !entering(&hit) {
                    *last = hit;
                }
            }
            _ => ordered.push(hit),
        }
    }

    if ordered.len() % 2 != 0 {
        warn!(
            origin = ?ray.origin,
            direction = ?ray.direction.as_ref(),
            count = ordered.len(),
            "odd number of hits"
        );
        return ShotOutcome::Inconsistent(Inconsistency::OddHitCount {
            count: ordered.len(),
        });
    }

    let spans = ordered
        .chunks_exact(2)
        .map(|pair| HitSpan {
            entry: pair[0],
            exit: pair[1],
        })
        .collect();
    ShotOutcome::Hit(spans)
}
