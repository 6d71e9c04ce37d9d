#![warn(missing_docs)]

//! Math types for the pipe kernel.
//!
//! Thin wrappers around nalgebra providing the types the pipe solid is
//! built from: points, vectors, directions, affine transforms, bounding
//! boxes, tolerance constants, and the polynomial solvers used by the
//! ray intersectors.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

pub mod bbox;
pub mod poly;

pub use bbox::Aabb3;
pub use poly::{solve_quadratic, solve_quartic, Complex, RootError};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation whose rows are the given (orthonormal) axes.
    ///
    /// Maps world vectors into the local frame spanned by `x`, `y`, `z`.
    pub fn from_rows(x: &Vec3, y: &Vec3, z: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for (row, axis) in [x, y, z].into_iter().enumerate() {
            m[(row, 0)] = axis.x;
            m[(row, 1)] = axis.y;
            m[(row, 2)] = axis.z;
        }
        Self { matrix: m }
    }

    /// Rotation whose columns are the given (orthonormal) axes.
    ///
    /// The inverse of [`Transform::from_rows`] for the same axes.
    pub fn from_columns(x: &Vec3, y: &Vec3, z: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for (col, axis) in [x, y, z].into_iter().enumerate() {
            m[(0, col)] = axis.x;
            m[(1, col)] = axis.y;
            m[(2, col)] = axis.z;
        }
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// Applying the result is `self(other(p))`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point, dividing through by the homogeneous coordinate.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        if v.w != 0.0 && v.w != 1.0 {
            Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
        } else {
            Point3::new(v.x, v.y, v.z)
        }
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Homogeneous scale factor stored in the bottom-right matrix entry.
    pub fn homogeneous_scale(&self) -> f64 {
        self.matrix[(3, 3)]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance, below which a length counts as zero.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-8 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-8,
        angular: 1e-9,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A unit vector perpendicular to `v`.
///
/// Zeroes the smallest component of `v` and swaps the other two, which
/// keeps the result well conditioned for any nonzero input.
pub fn orthogonal(v: &Vec3) -> Vec3 {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    let w = if ax <= ay && ax <= az {
        Vec3::new(0.0, -v.z, v.y)
    } else if ay <= az {
        Vec3::new(-v.z, 0.0, v.x)
    } else {
        Vec3::new(-v.y, v.x, 0.0)
    };
    let len = w.norm();
    if len > 0.0 {
        w / len
    } else {
        Vec3::x()
    }
}
