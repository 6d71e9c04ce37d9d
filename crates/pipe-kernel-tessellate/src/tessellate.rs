//! Segment walk producing the boundary mesh.

use pipe_kernel_geom::{BendSegment, LinearSegment, PreppedPipe, Segment};
use pipe_kernel_math::{Transform, Vec3};
use tracing::{debug, instrument};

use crate::mesh::{FaceKind, MeshBuilder, PipeMesh};
use crate::resolution::{arc_segments, bend_steps};
use crate::ring::{Frame, Ring};
use crate::TessellationParams;

/// Build the boundary mesh of `pipe`.
///
/// Rings are shared between neighbouring segments whenever their radii
/// agree, so the result is watertight. A radius jump between segments
/// becomes one or two annular faces. The mesh is a pure function of the
/// pipe and `params`.
#[instrument(skip_all, fields(segments = pipe.segments.len()))]
pub fn tessellate(pipe: &PreppedPipe, params: &TessellationParams) -> PipeMesh {
    let dist = params.dist;
    let mut builder = MeshBuilder::new(dist);
    let Some(first) = pipe.segments.first() else {
        return builder.finish();
    };

    let max_diameter = pipe
        .segments
        .iter()
        .map(|s| 2.0 * s.start_radii().1.max(s.end_radii().1))
        .fold(0.0, f64::max);
    let sides = arc_segments(params, max_diameter, pipe.bounds.diagonal());
    debug!(sides, "circle resolution");

    let mut frame = Frame::new(&first.start_tangent());
    let mut ring = Ring::new(
        &mut builder,
        &first.start_point(),
        &frame,
        first.start_radii(),
        sides,
        dist,
    );
    cap(&mut builder, FaceKind::StartCap, &ring, false, dist);

    for segment in &pipe.segments {
        let radii = segment.start_radii();
        if differs(radii.0, ring.inner_radius, dist) || differs(radii.1, ring.outer_radius, dist) {
            frame = frame.align(&segment.start_tangent());
            let next = Ring::new(
                &mut builder,
                &segment.start_point(),
                &frame,
                radii,
                sides,
                dist,
            );
            radius_change(&mut builder, &ring, &next, dist);
            ring = next;
        }

        match segment {
            Segment::Linear(linear) => {
                frame = frame.align(&linear.axis);
                let end = Ring::new(
                    &mut builder,
                    &linear.end(),
                    &frame,
                    (linear.top_inner_radius, linear.top_outer_radius),
                    sides,
                    dist,
                );
                linear_walls(&mut builder, linear, &ring, &end, dist);
                ring = end;
            }
            Segment::Bend(bend) => {
                let base = frame.align(&bend.rb);
                let steps = bend_steps(params, bend.angle, bend.bend_radius, bend.outer_radius, sides);
                for j in 1..=steps {
                    let theta = bend.angle * j as f64 / steps as f64;
                    frame = base.rotated(&Transform::rotation_about_axis(&bend.normal, theta));
                    let next = Ring::new(
                        &mut builder,
                        &bend.centerline_at(theta),
                        &frame,
                        (bend.inner_radius, bend.outer_radius),
                        sides,
                        dist,
                    );
                    bend_walls(&mut builder, bend, &ring, &next, dist);
                    ring = next;
                }
            }
        }
    }

    cap(&mut builder, FaceKind::EndCap, &ring, true, dist);
    builder.finish()
}

fn differs(a: f64, b: f64, dist: f64) -> bool {
    (a - b).abs() > dist
}

/// Wall quads between rings `a` and `b`, split into triangles.
///
/// `na`/`nb` give the outward normal at each sample. Inner walls wind the
/// other way so they face the bore.
fn wall(
    builder: &mut MeshBuilder,
    kind: FaceKind,
    (a, na): (&[usize], &[Vec3]),
    (b, nb): (&[usize], &[Vec3]),
) {
    let n = a.len();
    for i in 0..n {
        let j = (i + 1) % n;
        if kind == FaceKind::InnerWall {
            builder.face(kind, &[(a[i], na[i]), (b[j], nb[j]), (a[j], na[j])]);
            builder.face(kind, &[(a[i], na[i]), (b[i], nb[i]), (b[j], nb[j])]);
        } else {
            builder.face(kind, &[(a[i], na[i]), (a[j], na[j]), (b[j], nb[j])]);
            builder.face(kind, &[(a[i], na[i]), (b[j], nb[j]), (b[i], nb[i])]);
        }
    }
}

fn linear_walls(
    builder: &mut MeshBuilder,
    linear: &LinearSegment,
    start: &Ring,
    end: &Ring,
    dist: f64,
) {
    let t = linear.axis.into_inner();

    let slope = (linear.base_outer_radius - linear.top_outer_radius) / linear.length;
    let outer: Vec<Vec3> = start
        .radial
        .iter()
        .map(|r| (r + slope * t).normalize())
        .collect();
    wall(
        builder,
        FaceKind::OuterWall,
        (&start.outer, &outer),
        (&end.outer, &outer),
    );

    if linear.base_inner_radius > dist || linear.top_inner_radius > dist {
        let slope = (linear.base_inner_radius - linear.top_inner_radius) / linear.length;
        let inner: Vec<Vec3> = start
            .radial
            .iter()
            .map(|r| -(r + slope * t).normalize())
            .collect();
        wall(
            builder,
            FaceKind::InnerWall,
            (&start.inner, &inner),
            (&end.inner, &inner),
        );
    }
}

fn bend_walls(builder: &mut MeshBuilder, bend: &BendSegment, a: &Ring, b: &Ring, dist: f64) {
    wall(
        builder,
        FaceKind::OuterWall,
        (&a.outer, &a.radial),
        (&b.outer, &b.radial),
    );
    if bend.inner_radius > dist {
        let inward = |ring: &Ring| -> Vec<Vec3> { ring.radial.iter().map(|r| -r).collect() };
        wall(
            builder,
            FaceKind::InnerWall,
            (&a.inner, &inward(a)),
            (&b.inner, &inward(b)),
        );
    }
}

/// Annulus between the loops `high` (larger radius) and `low`, facing
/// `+tangent` when `forward`. Becomes a disk when `low` has collapsed.
fn band(
    builder: &mut MeshBuilder,
    kind: FaceKind,
    tangent: &Vec3,
    high: &[usize],
    (low, low_radius): (&[usize], f64),
    forward: bool,
    dist: f64,
) {
    let normal = if forward { *tangent } else { -tangent };
    let n = high.len();

    if low_radius <= dist {
        let mut disk: Vec<(usize, Vec3)> = high.iter().map(|&v| (v, normal)).collect();
        if !forward {
            disk.reverse();
        }
        builder.face(kind, &disk);
        return;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let quad = if forward {
            [high[i], high[j], low[j], low[i]]
        } else {
            [high[i], low[i], low[j], high[j]]
        };
        builder.face(kind, &quad.map(|v| (v, normal)));
    }
}

/// Close the pipe at one end: the annulus between the bore and the outer wall.
fn cap(builder: &mut MeshBuilder, kind: FaceKind, ring: &Ring, forward: bool, dist: f64) {
    if ring.outer_radius <= dist || (ring.outer_radius - ring.inner_radius).abs() <= dist {
        debug!(?kind, "cap too thin to mesh");
        return;
    }
    band(
        builder,
        kind,
        &ring.tangent,
        &ring.outer,
        (&ring.inner, ring.inner_radius),
        forward,
        dist,
    );
}

/// Faces exposed where ring `p` (end of one segment) meets ring `q`
/// (start of the next) with different radii.
fn radius_change(builder: &mut MeshBuilder, p: &Ring, q: &Ring, dist: f64) {
    let kind = FaceKind::RadiusChange;
    let t = p.tangent;

    let disjoint = p.outer_radius < q.inner_radius || q.outer_radius < p.inner_radius;
    if disjoint {
        debug!("radius change leaves the wall sections disjoint");
        band(builder, kind, &t, &p.outer, (&p.inner, p.inner_radius), true, dist);
        band(builder, kind, &t, &q.outer, (&q.inner, q.inner_radius), false, dist);
        return;
    }

    // Each annulus belongs to the ring whose material reaches across it:
    // the smaller bore or the larger outside.
    if differs(p.inner_radius, q.inner_radius, dist) {
        let (high, low, forward) = if p.inner_radius < q.inner_radius {
            (q, p, true)
        } else {
            (p, q, false)
        };
        band(
            builder,
            kind,
            &t,
            &high.inner,
            (&low.inner, low.inner_radius),
            forward,
            dist,
        );
    }
    if differs(p.outer_radius, q.outer_radius, dist) {
        let (high, low, forward) = if p.outer_radius > q.outer_radius {
            (p, q, true)
        } else {
            (q, p, false)
        };
        band(
            builder,
            kind,
            &t,
            &high.outer,
            (&low.outer, low.outer_radius),
            forward,
            dist,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TriangleMesh;
    use approx::assert_relative_eq;
    use pipe_kernel_geom::{prep, PipeVertex};
    use pipe_kernel_math::Point3;
    use std::f64::consts::PI;

    fn v(x: f64, y: f64, z: f64, id: f64, od: f64, r: f64) -> PipeVertex {
        PipeVertex::new(Point3::new(x, y, z), id, od, r)
    }

    fn straight(id: f64) -> PreppedPipe {
        prep(&[v(0.0, 0.0, 0.0, id, 2.0, 0.0), v(0.0, 0.0, 10.0, id, 2.0, 0.0)]).unwrap()
    }

    fn elbow(id: f64) -> PreppedPipe {
        prep(&[
            v(0.0, 0.0, 0.0, id, 2.0, 3.0),
            v(10.0, 0.0, 0.0, id, 2.0, 3.0),
            v(10.0, 10.0, 0.0, id, 2.0, 3.0),
        ])
        .unwrap()
    }

    fn stepped() -> PreppedPipe {
        prep(&[
            v(0.0, 0.0, 0.0, 0.0, 2.0, 0.0),
            v(0.0, 0.0, 5.0, 0.0, 2.0, 0.0),
            v(0.0, 0.0, 5.0, 0.0, 4.0, 0.0),
            v(0.0, 0.0, 10.0, 0.0, 4.0, 0.0),
        ])
        .unwrap()
    }

    /// Signed volume by the divergence theorem; positive when every
    /// triangle faces out.
    fn compute_mesh_volume(mesh: &TriangleMesh) -> f64 {
        let verts = &mesh.vertices;
        let mut vol = 0.0;
        for tri in mesh.indices.chunks(3) {
            let (i0, i1, i2) = (
                tri[0] as usize * 3,
                tri[1] as usize * 3,
                tri[2] as usize * 3,
            );
            let v0 = [verts[i0] as f64, verts[i0 + 1] as f64, verts[i0 + 2] as f64];
            let v1 = [verts[i1] as f64, verts[i1 + 1] as f64, verts[i1 + 2] as f64];
            let v2 = [verts[i2] as f64, verts[i2 + 1] as f64, verts[i2 + 2] as f64];
            vol += v0[0] * (v1[1] * v2[2] - v2[1] * v1[2])
                - v1[0] * (v0[1] * v2[2] - v2[1] * v0[2])
                + v2[0] * (v0[1] * v1[2] - v1[1] * v0[2]);
        }
        vol / 6.0
    }

    /// Area of a regular n-gon inscribed in the unit circle, over π.
    fn polygon_factor(n: usize) -> f64 {
        n as f64 / (2.0 * PI) * (2.0 * PI / n as f64).sin()
    }

    #[test]
    fn test_solid_cylinder_volume() {
        let params = TessellationParams::from_segments(32);
        let mesh = tessellate(&straight(0.0), &params);
        assert!(mesh.is_closed());
        let volume = compute_mesh_volume(&mesh.to_triangle_mesh());
        assert_relative_eq!(volume, 10.0 * PI * polygon_factor(32), max_relative = 1e-5);
    }

    #[test]
    fn test_hollow_cylinder_volume() {
        let params = TessellationParams::from_segments(32);
        let mesh = tessellate(&straight(1.0), &params);
        assert!(mesh.is_closed());
        assert!(mesh.faces_of(FaceKind::InnerWall).count() > 0);
        let volume = compute_mesh_volume(&mesh.to_triangle_mesh());
        let expected = 10.0 * PI * 0.75 * polygon_factor(32);
        assert_relative_eq!(volume, expected, max_relative = 1e-5);
    }

    #[test]
    fn test_elbow_volume() {
        let params = TessellationParams::from_segments(32);
        let mesh = tessellate(&elbow(0.0), &params);
        assert!(mesh.is_closed());
        let volume = compute_mesh_volume(&mesh.to_triangle_mesh());
        // Two 7 mm runs plus a quarter torus of centerline radius 3.
        let exact = PI * (14.0 + 1.5 * PI);
        assert!(volume > 0.0);
        assert!((volume - exact).abs() / exact < 0.02, "volume {volume}, exact {exact}");
    }

    #[test]
    fn test_hollow_elbow_is_closed() {
        let mesh = tessellate(&elbow(1.0), &TessellationParams::default());
        assert!(mesh.is_closed());
        assert!(mesh.faces_of(FaceKind::InnerWall).count() > 0);
        assert_eq!(mesh.faces_of(FaceKind::RadiusChange).count(), 0);
    }

    #[test]
    fn test_collinear_joint_leaves_no_gap() {
        let pipe = prep(&[
            v(0.0, 0.0, 0.0, 0.0, 2.0, 3.0),
            v(0.0, 0.0, 5.0, 0.0, 2.0, 3.0),
            v(0.0, 0.0, 10.0, 0.0, 2.0, 3.0),
        ])
        .unwrap();
        let params = TessellationParams::from_segments(32);
        let mesh = tessellate(&pipe, &params);
        assert!(mesh.is_closed());
        assert_eq!(mesh.faces_of(FaceKind::RadiusChange).count(), 0);
        let volume = compute_mesh_volume(&mesh.to_triangle_mesh());
        assert_relative_eq!(volume, 10.0 * PI * polygon_factor(32), max_relative = 1e-5);
    }

    #[test]
    fn test_radius_step_becomes_annulus() {
        let params = TessellationParams::from_segments(24);
        let mesh = tessellate(&stepped(), &params);
        assert!(mesh.is_closed());
        assert_eq!(mesh.faces_of(FaceKind::RadiusChange).count(), 24);
        for face in mesh.faces_of(FaceKind::RadiusChange) {
            // The wider run's back face looks down the pipe.
            assert!(face.normals.iter().all(|n| (n + Vec3::z()).norm() < 1e-12));
        }
        let volume = compute_mesh_volume(&mesh.to_triangle_mesh());
        let expected = (5.0 + 4.0 * 5.0) * PI * polygon_factor(24);
        assert_relative_eq!(volume, expected, max_relative = 1e-5);
    }

    #[test]
    fn test_solid_end_cap_is_one_polygon() {
        let params = TessellationParams::from_segments(16);
        let mesh = tessellate(&straight(0.0), &params);
        let caps: Vec<_> = mesh.faces_of(FaceKind::EndCap).collect();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].vertices.len(), 16);
        assert!((caps[0].normals[0] - Vec3::z()).norm() < 1e-12);

        let starts: Vec<_> = mesh.faces_of(FaceKind::StartCap).collect();
        assert_eq!(starts.len(), 1);
        assert!((starts[0].normals[0] + Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_hollow_caps_are_annuli() {
        let params = TessellationParams::from_segments(16);
        let mesh = tessellate(&straight(1.0), &params);
        assert_eq!(mesh.faces_of(FaceKind::StartCap).count(), 16);
        assert_eq!(mesh.faces_of(FaceKind::EndCap).count(), 16);
    }

    #[test]
    fn test_wall_normals_point_out() {
        let mesh = tessellate(&elbow(1.0), &TessellationParams::default());
        let pipe = elbow(1.0);
        let centerline = |p: &Point3| -> f64 {
            // Distance from the nearest centerline point, sampled coarsely.
            let mut best = f64::INFINITY;
            for segment in &pipe.segments {
                for k in 0..=64 {
                    let s = k as f64 / 64.0;
                    let c = match segment {
                        Segment::Linear(l) => l.start + s * l.length * l.axis.as_ref(),
                        Segment::Bend(b) => b.centerline_at(s * b.angle),
                    };
                    best = best.min((p - c).norm());
                }
            }
            best
        };
        for face in mesh.faces_of(FaceKind::OuterWall).take(200) {
            let p = mesh.positions[face.vertices[0]];
            let n = face.normals[0];
            assert!(centerline(&(p + 0.05 * n)) > centerline(&p));
        }
    }

    #[test]
    fn test_tessellation_is_deterministic() {
        let params = TessellationParams::default();
        assert_eq!(tessellate(&elbow(1.0), &params), tessellate(&elbow(1.0), &params));
    }

    #[test]
    fn test_finer_tolerance_means_more_faces() {
        let coarse = tessellate(&elbow(0.0), &TessellationParams::from_segments(8));
        let fine = tessellate(&elbow(0.0), &TessellationParams::from_segments(64));
        assert!(fine.faces.len() > coarse.faces.len());
    }

    #[test]
    fn test_tiny_normal_tolerance_is_capped() {
        let params = TessellationParams {
            norm: 1e-300,
            ..TessellationParams::default()
        };
        let mesh = tessellate(&straight(0.0), &params);
        assert!(mesh.is_closed());
        // Two triangles per side.
        assert_eq!(
            mesh.faces_of(FaceKind::OuterWall).count(),
            2 * crate::MAX_ARC_SEGMENTS
        );
    }

    #[test]
    fn test_empty_pipe_gives_empty_mesh() {
        let pipe = PreppedPipe {
            segments: Vec::new(),
            bounds: pipe_kernel_math::Aabb3::empty(),
        };
        let mesh = tessellate(&pipe, &TessellationParams::default());
        assert!(mesh.faces.is_empty());
        assert!(mesh.to_triangle_mesh().indices.is_empty());
    }
}
