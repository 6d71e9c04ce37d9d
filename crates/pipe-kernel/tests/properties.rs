//! Property-based tests for the pipe solid using the `proptest` crate.

use proptest::prelude::*;

use std::f64::consts::{FRAC_PI_4, TAU};

use pipe_kernel::pipe_kernel_geom::{export, import, validate, PipeVertex, PreppedPipe, Segment};
use pipe_kernel::pipe_kernel_math::{orthogonal, Point3, Transform, Vec3};
use pipe_kernel::{PipeSolid, Ray, Scratch, ShotOutcome, TessellationParams};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn v(x: f64, y: f64, z: f64, id: f64, od: f64, r: f64) -> PipeVertex {
    PipeVertex::new(Point3::new(x, y, z), id, od, r)
}

/// Solid elbow: two runs joined by a quarter bend of radius 3.
fn elbow() -> PipeSolid {
    PipeSolid::new(vec![
        v(0.0, 0.0, 0.0, 0.0, 2.0, 3.0),
        v(10.0, 0.0, 0.0, 0.0, 2.0, 3.0),
        v(10.0, 10.0, 0.0, 0.0, 2.0, 3.0),
    ])
    .unwrap()
}

/// Point containment for a solid (bore-free, untapered) pipe, grown by
/// `slack` (shrunk when negative).
fn inside(pipe: &PreppedPipe, p: &Point3, slack: f64) -> bool {
    pipe.segments.iter().any(|segment| match segment {
        Segment::Linear(l) => {
            let rel = p - l.start;
            let along = rel.dot(l.axis.as_ref());
            let radial = (rel - along * l.axis.as_ref()).norm();
            along >= -slack && along <= l.length + slack && radial <= l.base_outer_radius + slack
        }
        Segment::Bend(b) => {
            let rel = p - b.center;
            let height = rel.dot(b.normal.as_ref());
            let in_plane = (rel - height * b.normal.as_ref()).norm();
            let tube = ((in_plane - b.bend_radius).powi(2) + height * height).sqrt();
            let angle = b.angle_of(p);
            let margin = slack / b.bend_radius;
            let in_arc = angle <= b.angle + margin
                || (margin > 0.0 && angle >= std::f64::consts::TAU - margin);
            in_arc && tube <= b.outer_radius + slack
        }
    })
}

/// Ray from a point on a sphere of radius 30 toward `target`.
fn arb_ray() -> impl Strategy<Value = Ray> {
    (
        0.0f64..std::f64::consts::TAU,
        -1.0f64..1.0,
        (-1.5f64..11.5, -1.5f64..11.5, -1.5f64..1.5),
    )
        .prop_map(|(phi, cos_theta, (tx, ty, tz))| {
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            let origin = Point3::new(
                5.0 + 30.0 * sin_theta * phi.cos(),
                5.0 + 30.0 * sin_theta * phi.sin(),
                30.0 * cos_theta,
            );
            Ray::new(origin, Point3::new(tx, ty, tz) - origin)
        })
}

fn arb_vertex() -> impl Strategy<Value = PipeVertex> {
    (
        (-1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6),
        0.0f64..10.0,
        0.1f64..20.0,
        0.0f64..100.0,
    )
        .prop_map(|((x, y, z), id, od, r)| v(x, y, z, id, od, r))
}

// ---------------------------------------------------------------------------
// 1. Spans cover exactly the part of the ray inside the solid
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn shot_spans_match_containment(ray in arb_ray()) {
        let solid = elbow();
        let pipe = solid.prepped();
        let outcome = solid.shoot(&ray, &mut Scratch::new());
        prop_assert!(!matches!(outcome, ShotOutcome::Inconsistent(_)), "{:?}", outcome);

        let spans = outcome.spans();
        for pair in spans.windows(2) {
            prop_assert!(pair[0].exit.distance <= pair[1].entry.distance);
        }
        for span in spans {
            prop_assert!(span.entry.distance <= span.exit.distance);
            let d = ray.direction.as_ref();
            prop_assert!(span.entry.normal.dot(d) < 1e-6);
            prop_assert!(span.exit.normal.dot(d) > -1e-6);
        }

        for i in 0..=400 {
            let t = i as f64 * 0.15;
            let p = ray.at(t);
            let covered = spans
                .iter()
                .any(|s| s.entry.distance - 1e-6 <= t && t <= s.exit.distance + 1e-6);
            if inside(&pipe, &p, -1e-6) {
                prop_assert!(covered, "t = {} is inside but not in any span", t);
            }
            let deep = spans
                .iter()
                .any(|s| s.entry.distance + 1e-6 < t && t < s.exit.distance - 1e-6);
            if deep {
                prop_assert!(inside(&pipe, &p, 1e-6), "t = {} is in a span but outside", t);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Parity and alternation on bored, tapered, stepped 3-D pipes
// ---------------------------------------------------------------------------

/// One run of a generated pipe: length, turn from the previous run, turn
/// azimuth, outer diameter at its start and bend radius headroom.
type Leg = (f64, f64, f64, f64, f64);

/// Walk `legs` from the origin along +x. With `step`, the middle run is
/// split at its midpoint by a zero-length radius change.
fn build_path(legs: &[Leg], bore: f64, step: Option<(f64, f64)>) -> Vec<PipeVertex> {
    let vertex = |at: Point3, od: f64, bore: f64, headroom: f64| {
        PipeVertex::new(at, od * bore, od, od * 0.5 + headroom)
    };

    let mut at = Point3::origin();
    let mut dir = Vec3::x();
    let mut vertices = vec![vertex(at, legs[0].3, bore, legs[0].4)];
    for (k, &(length, turn, azimuth, od, headroom)) in legs.iter().enumerate() {
        if k > 0 {
            let p1 = orthogonal(&dir);
            let p2 = dir.cross(&p1);
            let side = azimuth.cos() * p1 + azimuth.sin() * p2;
            dir = (turn.cos() * dir + turn.sin() * side).normalize();
        }
        if let Some((step_od, step_bore)) = step.filter(|_| k == legs.len() / 2) {
            let mid = at + dir * (length * 0.5);
            vertices.push(vertex(mid, od, bore, headroom));
            vertices.push(vertex(mid, step_od, step_bore, headroom));
        }
        at += dir * length;
        let next = legs.get(k + 1).unwrap_or(&legs[k]);
        vertices.push(vertex(at, next.3, bore, next.4));
    }
    vertices
}

fn arb_pipe() -> impl Strategy<Value = Vec<PipeVertex>> {
    (
        prop::collection::vec(
            (8.0f64..14.0, 0.2f64..FRAC_PI_4, 0.0f64..TAU, 0.8f64..2.0, 0.2f64..2.0),
            3..5,
        ),
        prop_oneof![Just(0.0), 0.2f64..0.7],
        prop::option::of((0.8f64..2.5, prop_oneof![Just(0.0), 0.2f64..0.7])),
    )
        .prop_map(|(legs, bore, step)| build_path(&legs, bore, step))
        .prop_filter("structurally clean", |vertices| validate(vertices).is_empty())
}

/// Ray from a sphere around `bounds` toward a point inside them.
fn aimed_ray(
    bounds: &pipe_kernel::pipe_kernel_math::Aabb3,
    (phi, cos_theta, (fx, fy, fz)): (f64, f64, (f64, f64, f64)),
) -> Ray {
    let center = bounds.center();
    let reach = bounds.diagonal() + 5.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let origin = center
        + reach * Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    let size = bounds.max - bounds.min;
    let target = bounds.min + Vec3::new(fx * size.x, fy * size.y, fz * size.z);
    Ray::new(origin, target - origin)
}

proptest! {
    #[test]
    fn shots_pair_up_on_general_pipes(
        vertices in arb_pipe(),
        rays in prop::collection::vec(
            (0.0f64..TAU, -1.0f64..1.0, (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0)),
            16,
        ),
    ) {
        let solid = PipeSolid::new(vertices).unwrap();
        let bounds = solid.bounds();
        let mut scratch = Scratch::new();

        for params in rays {
            let ray = aimed_ray(&bounds, params);
            let outcome = solid.shoot(&ray, &mut scratch);
            prop_assert!(!matches!(outcome, ShotOutcome::Inconsistent(_)), "{:?} for {:?}", outcome, ray);

            let d = ray.direction.as_ref();
            let hits: Vec<_> = outcome
                .spans()
                .iter()
                .flat_map(|span| [span.entry, span.exit])
                .collect();
            prop_assert_eq!(hits.len() % 2, 0);
            for (i, hit) in hits.iter().enumerate() {
                let along = hit.normal.dot(d);
                if i % 2 == 0 {
                    prop_assert!(along < 1e-6, "hit {} should enter: {:?}", i, hit);
                } else {
                    prop_assert!(along > -1e-6, "hit {} should leave: {:?}", i, hit);
                }
            }
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Binary body round trip
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn body_round_trip(vertices in prop::collection::vec(arb_vertex(), 2..8)) {
        let bytes = export(&vertices, 1.0).unwrap();
        prop_assert_eq!(bytes.len(), 4 + 48 * vertices.len());
        let back = import(&bytes, &Transform::identity()).unwrap();
        prop_assert_eq!(back, vertices);
    }
}

// ---------------------------------------------------------------------------
// 4. Tessellated elbows are closed
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn elbow_meshes_are_closed(
        od in 0.5f64..4.0,
        bore in prop_oneof![Just(0.0), 0.2f64..0.8],
        extra_radius in 0.1f64..1.0,
        turn in 0.3f64..2.5,
    ) {
        let bend_radius = od * 0.5 + extra_radius;
        let far = Vec3::new(10.0 + 20.0 * turn.cos(), 20.0 * turn.sin(), 0.0);
        let solid = PipeSolid::new(vec![
            v(0.0, 0.0, 0.0, od * bore, od, bend_radius),
            v(10.0, 0.0, 0.0, od * bore, od, bend_radius),
            v(far.x, far.y, far.z, od * bore, od, bend_radius),
        ])
        .unwrap();
        let mesh = solid.to_mesh(&TessellationParams::default());
        prop_assert!(mesh.is_closed());
    }
}
