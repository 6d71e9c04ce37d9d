//! Prepared pipe segments.
//!
//! Each segment caches the frame transforms its intersector needs so that
//! shooting a ray never recomputes them.

use std::f64::consts::PI;

use pipe_kernel_math::{orthogonal, Aabb3, Dir3, Point3, Transform, Vec3};

// =============================================================================
// Linear segment
// =============================================================================

/// A straight, possibly tapered, run of pipe.
///
/// The outer (and inner) wall is a truncated cone from `start` to
/// `start + length * axis`, radii interpolating linearly between the base
/// and top values.
#[derive(Debug, Clone)]
pub struct LinearSegment {
    /// Centerline start point.
    pub start: Point3,
    /// Unit direction of travel.
    pub axis: Dir3,
    /// Centerline length.
    pub length: f64,
    /// Inner radius at the start.
    pub base_inner_radius: f64,
    /// Outer radius at the start.
    pub base_outer_radius: f64,
    /// Inner radius at the end.
    pub top_inner_radius: f64,
    /// Outer radius at the end.
    pub top_outer_radius: f64,
    /// World to local: rotate so the axis is +z, then scale z by `1/length`.
    ///
    /// The segment occupies `0 <= z <= 1` in local space.
    pub to_local: Transform,
    /// Local normal to world normal (transposed rotation after the z scale).
    pub normal_to_world: Transform,
    /// Bounds of the two end disks.
    pub bounds: Aabb3,
}

impl LinearSegment {
    /// Build a segment between two centerline points.
    ///
    /// Radii are given as diameters, matching [`crate::PipeVertex`].
    /// The caller guarantees `start != end`.
    pub fn new(
        start: Point3,
        end: Point3,
        base_inner_diameter: f64,
        base_outer_diameter: f64,
        top_inner_diameter: f64,
        top_outer_diameter: f64,
    ) -> Self {
        let along = end - start;
        let length = along.norm();
        let axis = Dir3::new_normalize(along);
        let v1 = orthogonal(axis.as_ref());
        let v2 = axis.cross(&v1);

        let squash = Transform::scale(1.0, 1.0, 1.0 / length);
        let to_local = squash.then(&Transform::from_rows(&v1, &v2, axis.as_ref()));
        let normal_to_world = Transform::from_columns(&v1, &v2, axis.as_ref()).then(&squash);

        let base_outer_radius = base_outer_diameter * 0.5;
        let top_outer_radius = top_outer_diameter * 0.5;
        let mut bounds = Aabb3::empty();
        bounds.include_disk(&start, axis.as_ref(), base_outer_radius);
        bounds.include_disk(&end, axis.as_ref(), top_outer_radius);
        bounds.expand(crate::LEN_TOL);

        Self {
            start,
            axis,
            length,
            base_inner_radius: base_inner_diameter * 0.5,
            base_outer_radius,
            top_inner_radius: top_inner_diameter * 0.5,
            top_outer_radius,
            to_local,
            normal_to_world,
            bounds,
        }
    }

    /// Centerline end point.
    pub fn end(&self) -> Point3 {
        self.start + self.length * self.axis.as_ref()
    }

    /// True if either end has a bore.
    pub fn has_bore(&self) -> bool {
        self.base_inner_radius > 0.0 || self.top_inner_radius > 0.0
    }
}

// =============================================================================
// Bend segment
// =============================================================================

/// A constant-radius bend: a slice of a torus of revolution.
///
/// The torus is centered at `center` with axis `normal`. The arc starts at
/// `start` (direction `ra` from the center) and sweeps `angle` radians
/// toward `rb`.
#[derive(Debug, Clone)]
pub struct BendSegment {
    /// Torus center.
    pub center: Point3,
    /// Torus axis (normal of the bend plane).
    pub normal: Dir3,
    /// Unit vector from the center toward the arc start.
    pub ra: Dir3,
    /// `normal × ra`: the in-plane direction of sweep at angle 90°.
    pub rb: Dir3,
    /// Centerline point where the bend begins.
    pub start: Point3,
    /// Centerline point where the bend ends.
    pub end: Point3,
    /// Outward normal of the plane closing the bend at `start` (`ra × normal`).
    pub start_normal: Dir3,
    /// Outward normal of the plane closing the bend at `end`.
    pub end_normal: Dir3,
    /// Centerline radius of the torus.
    pub bend_radius: f64,
    /// Swept angle in radians, in `(0, π)`.
    pub angle: f64,
    /// Inner tube radius.
    pub inner_radius: f64,
    /// Outer tube radius.
    pub outer_radius: f64,
    /// World to local: rows `(ra, rb, normal)`, scaled by `1/bend_radius`.
    ///
    /// In local space the centerline circle has unit radius.
    pub to_local: Transform,
    /// Local to world rotation (columns `(ra, rb, normal)`).
    pub to_world: Transform,
    /// Bounding sphere center.
    pub bound_center: Point3,
    /// Squared bounding sphere radius.
    pub bound_radius_sq: f64,
}

impl BendSegment {
    /// Build a bend around `center` from `start` to `end`.
    ///
    /// `max_outer_radius` bounds the tube in the neighbourhood of the bend
    /// (the largest outer radius of the bend vertex and its neighbours).
    pub fn new(
        center: Point3,
        start: Point3,
        end: Point3,
        inner_diameter: f64,
        outer_diameter: f64,
        max_outer_radius: f64,
    ) -> Self {
        let to_start = start - center;
        let to_end = end - center;
        let bend_radius = to_start.norm();

        let ra = Dir3::new_normalize(to_start);
        let normal = Dir3::new_normalize(to_start.cross(&to_end));
        let rb = Dir3::new_normalize(normal.cross(ra.as_ref()));
        let start_normal = Dir3::new_normalize(ra.cross(normal.as_ref()));
        let end_normal = Dir3::new_normalize(normal.cross(&to_end));

        let angle = to_start.cross(&to_end).norm().atan2(to_start.dot(&to_end));

        let shrink = 1.0 / bend_radius;
        let to_local = Transform::scale(shrink, shrink, shrink)
            .then(&Transform::from_rows(ra.as_ref(), rb.as_ref(), normal.as_ref()));
        let to_world = Transform::from_columns(ra.as_ref(), rb.as_ref(), normal.as_ref());

        let max_r = bend_radius + max_outer_radius;
        let half_chord = max_r * (angle * 0.5).sin();

        Self {
            center,
            normal,
            ra,
            rb,
            start,
            end,
            start_normal,
            end_normal,
            bend_radius,
            angle,
            inner_radius: inner_diameter * 0.5,
            outer_radius: outer_diameter * 0.5,
            to_local,
            to_world,
            bound_center: nalgebra::center(&start, &end),
            bound_radius_sq: half_chord * half_chord + max_outer_radius * max_outer_radius,
        }
    }

    /// Angle of a point around the torus axis, measured from `ra` toward
    /// `rb`, in `[0, 2π)`.
    pub fn angle_of(&self, point: &Point3) -> f64 {
        let to_point = point - self.center;
        let angle = to_point.dot(self.rb.as_ref()).atan2(to_point.dot(self.ra.as_ref()));
        if angle < 0.0 {
            angle + 2.0 * PI
        } else {
            angle
        }
    }

    /// Centerline point at `angle` radians into the bend.
    pub fn centerline_at(&self, angle: f64) -> Point3 {
        let (s, c) = angle.sin_cos();
        self.center + self.bend_radius * (c * self.ra.as_ref() + s * self.rb.as_ref())
    }

    /// Bounds of the bounding sphere.
    pub fn bounds(&self) -> Aabb3 {
        let r = self.bound_radius_sq.sqrt();
        let extent = Vec3::new(r, r, r);
        Aabb3::new(self.bound_center - extent, self.bound_center + extent)
    }
}

// =============================================================================
// Segment sequence
// =============================================================================

/// One piece of a prepared pipe.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Straight run.
    Linear(LinearSegment),
    /// Toroidal bend.
    Bend(BendSegment),
}

impl Segment {
    /// Centerline point where the segment begins.
    pub fn start_point(&self) -> Point3 {
        match self {
            Segment::Linear(l) => l.start,
            Segment::Bend(b) => b.start,
        }
    }

    /// Centerline point where the segment ends.
    pub fn end_point(&self) -> Point3 {
        match self {
            Segment::Linear(l) => l.end(),
            Segment::Bend(b) => b.end,
        }
    }

    /// `(inner, outer)` radii where the segment begins.
    pub fn start_radii(&self) -> (f64, f64) {
        match self {
            Segment::Linear(l) => (l.base_inner_radius, l.base_outer_radius),
            Segment::Bend(b) => (b.inner_radius, b.outer_radius),
        }
    }

    /// `(inner, outer)` radii where the segment ends.
    pub fn end_radii(&self) -> (f64, f64) {
        match self {
            Segment::Linear(l) => (l.top_inner_radius, l.top_outer_radius),
            Segment::Bend(b) => (b.inner_radius, b.outer_radius),
        }
    }

    /// Direction of travel where the segment begins.
    pub fn start_tangent(&self) -> Dir3 {
        match self {
            Segment::Linear(l) => l.axis,
            Segment::Bend(b) => b.rb,
        }
    }

    /// Direction of travel where the segment ends.
    pub fn end_tangent(&self) -> Dir3 {
        match self {
            Segment::Linear(l) => l.axis,
            Segment::Bend(b) => b.end_normal,
        }
    }

    /// Bounding box of the segment.
    pub fn bounds(&self) -> Aabb3 {
        match self {
            Segment::Linear(l) => l.bounds,
            Segment::Bend(b) => b.bounds(),
        }
    }
}

/// The result of preparing a pipe: an ordered, immutable segment list.
///
/// Safe to share between threads; shooting only reads it.
#[derive(Debug, Clone)]
pub struct PreppedPipe {
    /// Segments in path order.
    pub segments: Vec<Segment>,
    /// Bounds of every segment.
    pub bounds: Aabb3,
}

impl PreppedPipe {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        let mut bounds = Aabb3::empty();
        for segment in &segments {
            bounds.include_box(&segment.bounds());
        }
        Self { segments, bounds }
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point3 {
        self.bounds.center()
    }

    /// Radius of the sphere about [`PreppedPipe::center`] enclosing the bounds.
    pub fn bounding_radius(&self) -> f64 {
        self.bounds.diagonal() * 0.5
    }

    /// Number of bend segments.
    pub fn bend_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Bend(_)))
            .count()
    }
}
