//! Pipe control points and the editable pipe definition document.

use pipe_kernel_math::Point3;
use serde::{Deserialize, Serialize};

/// One control point of a pipe.
///
/// Diameters and the bend radius are in model units. The bend radius is the
/// centerline radius of the torus joining the two straight runs meeting at
/// this point; it is ignored at the first and last vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeVertex {
    /// Centerline position.
    pub position: Point3,
    /// Inner (bore) diameter, zero for a solid rod.
    pub inner_diameter: f64,
    /// Outer diameter.
    pub outer_diameter: f64,
    /// Centerline bend radius at this vertex.
    pub bend_radius: f64,
}

impl PipeVertex {
    /// Create a vertex.
    pub fn new(position: Point3, inner_diameter: f64, outer_diameter: f64, bend_radius: f64) -> Self {
        Self {
            position,
            inner_diameter,
            outer_diameter,
            bend_radius,
        }
    }

    /// Inner radius (half the inner diameter).
    pub fn inner_radius(&self) -> f64 {
        self.inner_diameter * 0.5
    }

    /// Outer radius (half the outer diameter).
    pub fn outer_radius(&self) -> f64 {
        self.outer_diameter * 0.5
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self.inner_diameter.is_finite()
            && self.outer_diameter.is_finite()
            && self.bend_radius.is_finite()
    }
}

/// A pipe as stored in a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeDefinition {
    /// Ordered control points.
    pub vertices: Vec<PipeVertex>,
}

impl PipeDefinition {
    /// Wrap a vertex list.
    pub fn new(vertices: Vec<PipeVertex>) -> Self {
        Self { vertices }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radii() {
        let v = PipeVertex::new(Point3::origin(), 1.0, 4.0, 6.0);
        assert_eq!(v.inner_radius(), 0.5);
        assert_eq!(v.outer_radius(), 2.0);
        assert!(v.is_finite());
        let bad = PipeVertex::new(Point3::new(f64::NAN, 0.0, 0.0), 0.0, 1.0, 1.0);
        assert!(!bad.is_finite());
    }

    #[test]
    fn test_json_roundtrip() {
        let def = PipeDefinition::new(vec![
            PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 2.0, 3.0),
            PipeVertex::new(Point3::new(10.0, 0.0, 0.0), 1.0, 2.0, 3.0),
        ]);
        let json = def.to_json().unwrap();
        assert!(json.contains("outer_diameter"));
        let back = PipeDefinition::from_json(&json).unwrap();
        assert_eq!(back, def);
    }
}
