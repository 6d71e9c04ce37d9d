//! Structural validity checks.
//!
//! These never fail: they report every problem found so an editor can show
//! them all at once. [`crate::prep`] accepts pipes that produce warnings here.

use std::f64::consts::PI;
use std::fmt;

use pipe_kernel_math::{Point3, Vec3};

use crate::vertex::PipeVertex;

/// A structural problem with a vertex list.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Fewer than two vertices.
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },
    /// The bore is as wide as the pipe.
    InnerNotLessThanOuter {
        /// Offending vertex.
        index: usize,
        /// Its inner diameter.
        inner_diameter: f64,
        /// Its outer diameter.
        outer_diameter: f64,
    },
    /// The bend would fold the inside of the pipe over itself.
    BendRadiusTooSmall {
        /// Offending vertex.
        index: usize,
        /// Its bend radius.
        bend_radius: f64,
        /// Its position.
        at: Point3,
    },
    /// Two neighbouring bends need more room than the run between them.
    BendsOverlap {
        /// Vertex at the start of the run.
        previous: usize,
        /// Vertex at the end of the run.
        index: usize,
        /// Combined setback of the two bends.
        needed: f64,
        /// Length of the run.
        available: f64,
    },
    /// The final run is shorter than the setback of the last bend.
    LastSegmentTooShort {
        /// Vertex carrying the last bend.
        index: usize,
        /// Setback of that bend.
        needed: f64,
        /// Length of the final run.
        available: f64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::TooFewVertices { count } => {
                write!(f, "pipe needs at least 2 vertices, has {count}")
            }
            Warning::InnerNotLessThanOuter {
                inner_diameter,
                outer_diameter,
                ..
            } => write!(
                f,
                "Inner diameter ({inner_diameter}mm) has to be less than outer diameter ({outer_diameter}mm)"
            ),
            Warning::BendRadiusTooSmall { bend_radius, at, .. } => write!(
                f,
                "Bend radius ({bend_radius}mm) is less than outer radius at ({} {} {})",
                at.x, at.y, at.z
            ),
            Warning::BendsOverlap {
                previous,
                index,
                needed,
                available,
            } => write!(
                f,
                "Bend radii at vertices {previous} and {index} are too large: {needed} > {available}"
            ),
            Warning::LastSegmentTooShort {
                index,
                needed,
                available,
            } => write!(
                f,
                "last segment is too short to allow the bend at vertex {index}: {needed} > {available}"
            ),
        }
    }
}

/// Check a vertex list for geometry that cannot be built cleanly.
pub fn validate(vertices: &[PipeVertex]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let count = vertices.len();
    if count < 2 {
        warnings.push(Warning::TooFewVertices { count });
    }

    for (index, v) in vertices.iter().enumerate() {
        if v.inner_diameter >= v.outer_diameter {
            warnings.push(Warning::InnerNotLessThanOuter {
                index,
                inner_diameter: v.inner_diameter,
                outer_diameter: v.outer_diameter,
            });
        }
        if index + 1 < count && v.bend_radius < v.outer_radius() {
            warnings.push(Warning::BendRadiusTooSmall {
                index,
                bend_radius: v.bend_radius,
                at: v.position,
            });
        }
    }

    let mut old_setback = 0.0;
    let mut last_run = 0.0;
    for index in 1..count.saturating_sub(1) {
        let prev = &vertices[index - 1];
        let here = &vertices[index];
        let next = &vertices[index + 1];

        let v1 = prev.position - here.position;
        let v2 = next.position - here.position;
        let run = v1.norm();
        last_run = v2.norm();

        let setback = bend_setback(here.bend_radius, &v1, &v2);
        if setback + old_setback > run {
            warnings.push(Warning::BendsOverlap {
                previous: index - 1,
                index,
                needed: setback + old_setback,
                available: run,
            });
        }
        old_setback = setback;
    }

    if count > 2 && old_setback > last_run {
        warnings.push(Warning::LastSegmentTooShort {
            index: count - 2,
            needed: old_setback,
            available: last_run,
        });
    }

    warnings
}

/// Distance from a vertex to where its bend begins along each run.
fn bend_setback(bend_radius: f64, v1: &Vec3, v2: &Vec3) -> f64 {
    let u1 = v1.normalize();
    let u2 = v2.normalize();
    let sin_turn = u1.cross(&u2).norm();
    if !(sin_turn >= 1e-18) {
        return 0.0;
    }
    let angle = PI - u1.dot(&u2).clamp(-1.0, 1.0).acos();
    bend_radius * (angle * 0.5).tan()
}
