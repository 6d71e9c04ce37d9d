//! Cross-section frames and sampled rings.

use std::f64::consts::PI;

use pipe_kernel_math::{orthogonal, Dir3, Point3, Transform, Vec3};

use crate::mesh::MeshBuilder;

/// Orthonormal frame carried along the centerline.
///
/// `r1`, `r2` span the cross-section plane with `r2 = tangent × r1`, so
/// increasing angle winds counter-clockwise seen from ahead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub tangent: Vec3,
    pub r1: Vec3,
    pub r2: Vec3,
}

impl Frame {
    pub(crate) fn new(tangent: &Dir3) -> Self {
        let t = tangent.into_inner();
        let r1 = orthogonal(&t);
        Self {
            tangent: t,
            r1,
            r2: t.cross(&r1),
        }
    }

    /// The frame turned onto `tangent` with the least twist.
    pub(crate) fn align(&self, tangent: &Dir3) -> Self {
        let t = tangent.into_inner();
        let projected = self.r1 - self.r1.dot(&t) * t;
        let len = projected.norm();
        if len < 1e-9 {
            return Self::new(tangent);
        }
        let r1 = projected / len;
        Self {
            tangent: t,
            r1,
            r2: t.cross(&r1),
        }
    }

    pub(crate) fn rotated(&self, rotation: &Transform) -> Self {
        Self {
            tangent: rotation.apply_vec(&self.tangent).normalize(),
            r1: rotation.apply_vec(&self.r1).normalize(),
            r2: rotation.apply_vec(&self.r2).normalize(),
        }
    }

    pub(crate) fn radial(&self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        c * self.r1 + s * self.r2
    }
}

/// A sampled cross-section: outer and inner circles around one
/// centerline point.
///
/// A radius at or below the merge distance collapses its loop to the
/// center vertex.
#[derive(Debug, Clone)]
pub(crate) struct Ring {
    pub tangent: Vec3,
    pub outer: Vec<usize>,
    pub inner: Vec<usize>,
    pub radial: Vec<Vec3>,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Ring {
    pub(crate) fn new(
        builder: &mut MeshBuilder,
        center: &Point3,
        frame: &Frame,
        (inner_radius, outer_radius): (f64, f64),
        sides: usize,
        dist: f64,
    ) -> Self {
        let radial: Vec<Vec3> = (0..sides)
            .map(|i| frame.radial(2.0 * PI * i as f64 / sides as f64))
            .collect();

        let mut sample = |radius: f64| -> Vec<usize> {
            if radius <= dist {
                vec![builder.vertex(*center); sides]
            } else {
                radial
                    .iter()
                    .map(|r| builder.vertex(center + radius * *r))
                    .collect()
            }
        };
        let outer = sample(outer_radius);
        let inner = sample(inner_radius);

        Self {
            tangent: frame.tangent,
            outer,
            inner,
            radial,
            inner_radius,
            outer_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_frame_is_right_handed() {
        let frame = Frame::new(&Dir3::new_normalize(Vec3::new(1.0, 2.0, 3.0)));
        assert!(frame.r1.dot(&frame.tangent).abs() < 1e-12);
        assert!((frame.r1.cross(&frame.r2) - frame.tangent).norm() < 1e-12);
    }

    #[test]
    fn test_align_keeps_twist_small() {
        let frame = Frame::new(&Dir3::new_normalize(Vec3::z()));
        let tilted = frame.align(&Dir3::new_normalize(Vec3::new(0.1, 0.0, 1.0)));
        assert!(tilted.r1.dot(&frame.r1) > 0.99);
        assert!((tilted.r1.cross(&tilted.r2) - tilted.tangent).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_carries_tangent_round_a_bend() {
        let frame = Frame::new(&Dir3::new_normalize(Vec3::y()));
        let turned = frame.rotated(&Transform::rotation_about_axis(&Vec3::z_axis(), FRAC_PI_2));
        assert!((turned.tangent + Vec3::x()).norm() < 1e-12);
    }

    #[test]
    fn test_collapsed_inner_loop() {
        let mut builder = MeshBuilder::new(1e-4);
        let frame = Frame::new(&Vec3::z_axis());
        let ring = Ring::new(&mut builder, &Point3::origin(), &frame, (0.0, 1.0), 8, 1e-4);
        assert_eq!(ring.radial.len(), 8);
        assert!(ring.inner.iter().all(|&i| i == ring.inner[0]));
        assert_eq!(builder.finish().positions.len(), 9);
    }
}
