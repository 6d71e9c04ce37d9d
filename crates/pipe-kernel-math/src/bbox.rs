//! Axis-aligned bounding boxes.
//!
//! Used as a broadphase filter: a ray only needs the analytic surface
//! tests of a segment whose box it crosses.

use crate::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Expand this AABB to include a circular disk.
    ///
    /// The disk lies in the plane through `center` with unit normal `axis`.
    /// Along world axis `i` the disk extends `radius * sqrt(1 - axis_i^2)`.
    pub fn include_disk(&mut self, center: &Point3, axis: &Vec3, radius: f64) {
        let extent = Vec3::new(
            radius * (1.0 - axis.x * axis.x).max(0.0).sqrt(),
            radius * (1.0 - axis.y * axis.y).max(0.0).sqrt(),
            radius * (1.0 - axis.z * axis.z).max(0.0).sqrt(),
        );
        self.include_point(&(center - extent));
        self.include_point(&(center + extent));
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }

    /// Test if the line `origin + t * direction` crosses this box.
    ///
    /// Slab method over the whole line, so both signs of `t` count.
    /// Returns the entry and exit parameters.
    pub fn intersect_line(&self, origin: &Point3, direction: &Vec3) -> Option<(f64, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for i in 0..3 {
            let o = origin[i];
            let d = direction[i];
            if d.abs() < 1e-300 {
                // Parallel to this slab pair: inside or never.
                if o < self.min[i] || o > self.max[i] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t1 = (self.min[i] - o) * inv;
            let mut t2 = (self.max[i] - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
        }

        if t_max >= t_min {
            Some((t_min, t_max))
        } else {
            None
        }
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}
