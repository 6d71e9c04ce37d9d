//! Ray intersection with a bend (torus section).
//!
//! The ray is moved into the bend's frame, where the torus has unit
//! centerline radius and lies in the `z = 0` plane:
//!
//! ```text
//! (x² + y² + z² + 1 - α²)² = 4 (x² + y²)
//! ```
//!
//! with `α` the tube radius over the bend radius. Substituting the ray gives
//! a quartic in the ray parameter.

use pipe_kernel_geom::BendSegment;
use pipe_kernel_math::{solve_quartic, Dir3, Point3, Vec3};

use crate::diagnostics::Diagnostics;
use crate::hits::{CandidateHit, LocalHit, SurfaceTag};
use crate::scratch::Scratch;
use crate::Ray;

/// Roots with a larger imaginary part are not crossings.
pub const IMAGINARY_TOL: f64 = 1e-4;

/// `|D·N|` below which the ray is treated as parallel to the bend plane.
pub const PARALLEL_TOL: f64 = 5e-7;

/// Push every crossing of the outer and inner tori of `bend` inside its arc.
pub fn intersect_bend(
    ray: &Ray,
    bend: &BendSegment,
    index: usize,
    scratch: &mut Scratch,
    diagnostics: &Diagnostics,
) {
    if ray.distance_sq_to(&bend.bound_center) > bend.bound_radius_sq {
        return;
    }

    let along_normal = ray.direction.dot(bend.normal.as_ref());
    let height = (ray.origin - bend.center).dot(bend.normal.as_ref()).abs();

    torus_hits(
        ray,
        bend,
        index,
        bend.outer_radius,
        along_normal,
        height,
        SurfaceTag::OuterWall,
        scratch,
        diagnostics,
    );
    if bend.inner_radius > 0.0 {
        torus_hits(
            ray,
            bend,
            index,
            bend.inner_radius,
            along_normal,
            height,
            SurfaceTag::InnerWall,
            scratch,
            diagnostics,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn torus_hits(
    ray: &Ray,
    bend: &BendSegment,
    index: usize,
    tube_radius: f64,
    along_normal: f64,
    height: f64,
    surface: SurfaceTag,
    scratch: &mut Scratch,
    diagnostics: &Diagnostics,
) {
    // A ray in a plane parallel to the bend that clears the tube.
    if along_normal.abs() < PARALLEL_TOL && height > tube_radius {
        return;
    }

    let p = bend.to_local.apply_vec(&(ray.origin - bend.center));
    let d = bend.to_local.apply_vec(ray.direction.as_ref()).normalize();

    // Restart the line at its point closest to the torus center.
    let shift = p.dot(&d);
    let c = p - shift * d;

    let alpha = tube_radius / bend.bend_radius;
    let x2_y2 = [
        d.x * d.x + d.y * d.y,
        2.0 * (d.x * c.x + d.y * c.y),
        c.x * c.x + c.y * c.y,
    ];
    let a = [d.dot(&d), 2.0 * c.dot(&d), c.dot(&c) + 1.0 - alpha * alpha];
    let coeffs = [
        a[0] * a[0],
        2.0 * a[0] * a[1],
        a[1] * a[1] + 2.0 * a[0] * a[2] - 4.0 * x2_y2[0],
        2.0 * a[1] * a[2] - 4.0 * x2_y2[1],
        a[2] * a[2] - 4.0 * x2_y2[2],
    ];

    let roots = match solve_quartic(&coeffs) {
        Ok(roots) => roots,
        Err(error) => {
            diagnostics.root_solver_failed(ray, index, &error);
            return;
        }
    };

    for root in roots {
        if root.im.abs() >= IMAGINARY_TOL {
            continue;
        }
        let distance = (root.re - shift) * bend.bend_radius;
        if bend.angle_of(&ray.at(distance)) > bend.angle {
            continue;
        }
        scratch.push(CandidateHit {
            distance,
            segment: index,
            surface,
            local: LocalHit::Wall(Point3::from(c + root.re * d)),
        });
    }
}

/// Outward normal of a torus point given in the bend frame.
pub(crate) fn torus_normal(bend: &BendSegment, local: &Point3, inner: bool) -> Dir3 {
    let tube_radius = if inner {
        bend.inner_radius
    } else {
        bend.outer_radius
    };
    let alpha = tube_radius / bend.bend_radius;
    let w = local.coords.norm_squared() + 1.0 - alpha * alpha;
    let gradient = Vec3::new((w - 2.0) * local.x, (w - 2.0) * local.y, w * local.z);
    let normal = bend.to_world.apply_vec(&gradient);
    Dir3::new_normalize(if inner { -normal } else { normal })
}
