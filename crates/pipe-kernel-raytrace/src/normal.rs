//! Outward normals of candidate hits.

use pipe_kernel_geom::Segment;
use pipe_kernel_math::Dir3;

use crate::hits::{CandidateHit, LocalHit, SurfaceTag};
use crate::intersect::{torus_normal, wall_normal};

/// Outward normal of `hit`, which was produced by `segment`.
///
/// Wall normals are the gradient of the segment's implicit surface mapped
/// back to world space, flipped for the bore. Planar hits carry theirs.
pub fn surface_normal(segment: &Segment, hit: &CandidateHit) -> Dir3 {
    let inner = hit.surface == SurfaceTag::InnerWall;
    match (&hit.local, segment) {
        (LocalHit::Plane { outward }, _) => *outward,
        (LocalHit::Wall(local), Segment::Linear(seg)) => wall_normal(seg, local, inner),
        (LocalHit::Wall(local), Segment::Bend(bend)) => torus_normal(bend, local, inner),
    }
}
