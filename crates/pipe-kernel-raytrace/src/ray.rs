//! Ray representation.

use pipe_kernel_math::{Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// Shooting treats the ray as a full line: crossings behind the origin are
/// reported with negative distances and the caller clips to its interval.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Squared distance from `point` to the line carrying this ray.
    #[inline]
    pub fn distance_sq_to(&self, point: &Point3) -> f64 {
        (point - self.origin).cross(self.direction.as_ref()).norm_squared()
    }
}
