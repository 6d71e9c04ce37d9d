//! Ray intersection with a straight, possibly tapered, segment.
//!
//! In the segment's canonical frame the axis is +z, the segment spans
//! `0 <= z <= 1` and the wall is `x² + y² = (r0 + z·(r1 - r0))²`.

use pipe_kernel_geom::LinearSegment;
use pipe_kernel_math::{solve_quadratic, Dir3, Point3, Vec3};

use crate::hits::{CandidateHit, LocalHit, SurfaceTag};
use crate::scratch::Scratch;
use crate::Ray;

/// Push every crossing of the outer and inner walls of `seg`.
pub fn intersect_linear(ray: &Ray, seg: &LinearSegment, index: usize, scratch: &mut Scratch) {
    if seg
        .bounds
        .intersect_line(&ray.origin, ray.direction.as_ref())
        .is_none()
    {
        return;
    }

    // The direction is not renormalized, so local roots are world distances.
    let p = seg.to_local.apply_vec(&(ray.origin - seg.start));
    let d = seg.to_local.apply_vec(ray.direction.as_ref());

    wall_hits(
        &p,
        &d,
        seg.base_outer_radius,
        seg.top_outer_radius,
        index,
        SurfaceTag::OuterWall,
        scratch,
    );
    if seg.has_bore() {
        wall_hits(
            &p,
            &d,
            seg.base_inner_radius,
            seg.top_inner_radius,
            index,
            SurfaceTag::InnerWall,
            scratch,
        );
    }
}

fn wall_hits(
    p: &Vec3,
    d: &Vec3,
    base: f64,
    top: f64,
    index: usize,
    surface: SurfaceTag,
    scratch: &mut Scratch,
) {
    let slope = top - base;
    let slope_sq = slope * slope;

    let a = d.x * d.x + d.y * d.y - d.z * d.z * slope_sq;
    let b = 2.0 * (p.x * d.x + p.y * d.y - p.z * d.z * slope_sq - d.z * base * slope);
    let c = p.x * p.x + p.y * p.y - base * base - p.z * p.z * slope_sq - 2.0 * p.z * base * slope;

    for t in solve_quadratic(a, b, c) {
        let local = Point3::from(p + t * d);
        if (0.0..=1.0).contains(&local.z) {
            scratch.push(CandidateHit {
                distance: t,
                segment: index,
                surface,
                local: LocalHit::Wall(local),
            });
        }
    }
}

/// Outward normal of a wall point given in the canonical frame.
pub(crate) fn wall_normal(seg: &LinearSegment, local: &Point3, inner: bool) -> Dir3 {
    let (base, top) = if inner {
        (seg.base_inner_radius, seg.top_inner_radius)
    } else {
        (seg.base_outer_radius, seg.top_outer_radius)
    };
    let slope = top - base;
    let gradient = Vec3::new(local.x, local.y, -(base + local.z * slope) * slope);
    let normal = seg.normal_to_world.apply_vec(&gradient);
    Dir3::new_normalize(if inner { -normal } else { normal })
}
