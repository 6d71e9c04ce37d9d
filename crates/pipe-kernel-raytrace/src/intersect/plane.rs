//! Ray intersection with the planar annuli closing the pipe: the end caps
//! and the steps where neighbouring segments disagree on radii.

use pipe_kernel_geom::{Segment, LEN_TOL};
use pipe_kernel_math::{Dir3, Point3};

use crate::hits::{CandidateHit, LocalHit, SurfaceTag};
use crate::scratch::Scratch;
use crate::Ray;

/// Crossing of the plane through `center` with normal `normal`.
///
/// Returns the distance and the squared radial distance from `center`, or
/// `None` when the ray runs parallel to the plane.
pub fn intersect_plane(ray: &Ray, center: &Point3, normal: &Dir3) -> Option<(f64, f64)> {
    let denom = ray.direction.dot(normal.as_ref());
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = (center - ray.origin).dot(normal.as_ref()) / denom;
    let radial_sq = (ray.at(t) - center).norm_squared();
    Some((t, radial_sq))
}

fn within(radial_sq: f64, (inner, outer): (f64, f64)) -> bool {
    inner * inner <= radial_sq && radial_sq <= outer * outer
}

/// Push the start cap crossing of the first segment.
pub fn intersect_start_cap(ray: &Ray, first: &Segment, scratch: &mut Scratch) {
    let outward = Dir3::new_unchecked(-first.start_tangent().into_inner());
    annulus_hit(
        ray,
        &first.start_point(),
        outward,
        first.start_radii(),
        0,
        SurfaceTag::StartCap,
        scratch,
    );
}

/// Push the end cap crossing of the last segment.
pub fn intersect_end_cap(ray: &Ray, last: &Segment, index: usize, scratch: &mut Scratch) {
    annulus_hit(
        ray,
        &last.end_point(),
        last.end_tangent(),
        last.end_radii(),
        index,
        SurfaceTag::EndCap,
        scratch,
    );
}

fn annulus_hit(
    ray: &Ray,
    center: &Point3,
    outward: Dir3,
    radii: (f64, f64),
    index: usize,
    surface: SurfaceTag,
    scratch: &mut Scratch,
) {
    let Some((distance, radial_sq)) = intersect_plane(ray, center, &outward) else {
        return;
    };
    if within(radial_sq, radii) {
        scratch.push(CandidateHit {
            distance,
            segment: index,
            surface,
            local: LocalHit::Plane { outward },
        });
    }
}

/// True if the radii at the end of `before` differ from the start of `after`.
pub fn has_radius_change(before: &Segment, after: &Segment) -> bool {
    let (inner_a, outer_a) = before.end_radii();
    let (inner_b, outer_b) = after.start_radii();
    (inner_a - inner_b).abs() > LEN_TOL || (outer_a - outer_b).abs() > LEN_TOL
}

/// Push the crossing of the step annulus between segments `index` and
/// `index + 1`.
///
/// Material lies behind the junction where the radial distance falls in
/// the range of `before` and ahead of it in the range of `after`. A crossing
/// inside exactly one range is on the step; inside both or neither it is not.
pub fn intersect_radius_change(
    ray: &Ray,
    before: &Segment,
    after: &Segment,
    index: usize,
    scratch: &mut Scratch,
) {
    let tangent = before.end_tangent();
    let Some((distance, radial_sq)) = intersect_plane(ray, &before.end_point(), &tangent) else {
        return;
    };

    let behind = within(radial_sq, before.end_radii());
    let ahead = within(radial_sq, after.start_radii());
    let outward = match (behind, ahead) {
        (true, false) => tangent,
        (false, true) => Dir3::new_unchecked(-tangent.into_inner()),
        _ => return,
    };
    scratch.push(CandidateHit {
        distance,
        segment: index,
        surface: SurfaceTag::RadiusChange,
        local: LocalHit::Plane { outward },
    });
}
