//! Segment decomposition.
//!
//! Walks consecutive vertex triples and replaces each interior vertex with
//! a tangent bend, trimming the straight runs on either side by the bend
//! setback `r * tan(θ/2)`.

use std::f64::consts::PI;

use pipe_kernel_math::{Tolerance, Vec3};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::segment::{BendSegment, LinearSegment, PreppedPipe, Segment};
use crate::vertex::PipeVertex;

/// Length below which two centerline points are the same point.
pub const LEN_TOL: f64 = Tolerance::DEFAULT.linear;

/// Errors from [`prep`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepError {
    /// A pipe needs at least two vertices.
    #[error("pipe needs at least 2 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },
    /// A coordinate, diameter or bend radius is NaN or infinite.
    #[error("vertex {index} has a non-finite value")]
    NonFinite {
        /// Offending vertex.
        index: usize,
    },
    /// All vertices coincide so no segment exists.
    #[error("all pipe vertices coincide")]
    Degenerate,
    /// The path doubles back on itself at a vertex with a bend radius.
    #[error("bend at vertex {index} turns {angle} radians, bends must turn less than 180 degrees")]
    BendTooSharp {
        /// Offending vertex.
        index: usize,
        /// Requested turn angle in radians.
        angle: f64,
    },
}

/// Decompose a vertex list into linear and bend segments.
///
/// Consecutive duplicate vertices are skipped. A straight or degenerate
/// turn produces a single straight run to the vertex. Otherwise the vertex
/// becomes a bend tangent to both neighbouring runs, and the run leading up
/// to it is shortened to end where the bend starts.
#[instrument(skip(vertices), fields(count = vertices.len()))]
pub fn prep(vertices: &[PipeVertex]) -> Result<PreppedPipe, PrepError> {
    if vertices.len() < 2 {
        return Err(PrepError::TooFewVertices {
            count: vertices.len(),
        });
    }
    if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(PrepError::NonFinite { index });
    }

    let angular = Tolerance::DEFAULT.angular;
    let mut segments = Vec::with_capacity(vertices.len() * 2);

    let mut curr_pt = vertices[0].position;
    let mut curr_id = vertices[0].inner_diameter;
    let mut curr_od = vertices[0].outer_diameter;
    let mut prev = 0;

    for index in 1..vertices.len() {
        let here = &vertices[index];
        let n1 = curr_pt - here.position;

        if n1.norm() < LEN_TOL {
            debug!(index, "skipping duplicate vertex");
        } else if let Some(next) = vertices.get(index + 1) {
            let n2 = next.position - here.position;
            let u1 = n1.normalize();
            let u2 = n2.normalize();
            let turn = PI - u1.dot(&u2).clamp(-1.0, 1.0).acos();
            let setback = here.bend_radius * (turn * 0.5).tan();

            if turn >= PI - angular && here.bend_radius > LEN_TOL {
                return Err(PrepError::BendTooSharp { index, angle: turn });
            }

            let plane_normal = u1.cross(&u2);
            let sin_turn = plane_normal.norm();
            if !(sin_turn >= angular) || !setback.is_finite() || setback < LEN_TOL {
                segments.push(Segment::Linear(LinearSegment::new(
                    curr_pt,
                    here.position,
                    curr_id,
                    curr_od,
                    here.inner_diameter,
                    here.outer_diameter,
                )));
                curr_pt = here.position;
            } else {
                let mut bend_start = here.position + setback * u1;
                let bend_end = here.position + setback * u2;

                if (curr_pt - bend_start).norm() <= LEN_TOL {
                    bend_start = curr_pt;
                } else {
                    segments.push(Segment::Linear(LinearSegment::new(
                        curr_pt,
                        bend_start,
                        curr_id,
                        curr_od,
                        here.inner_diameter,
                        here.outer_diameter,
                    )));
                }

                let toward_center: Vec3 = u1.cross(&(plane_normal / sin_turn));
                let center = bend_start - here.bend_radius * toward_center;
                let max_outer_radius = here
                    .outer_radius()
                    .max(vertices[prev].outer_radius())
                    .max(next.outer_radius());

                segments.push(Segment::Bend(BendSegment::new(
                    center,
                    bend_start,
                    bend_end,
                    here.inner_diameter,
                    here.outer_diameter,
                    max_outer_radius,
                )));
                curr_pt = bend_end;
            }
        } else {
            segments.push(Segment::Linear(LinearSegment::new(
                curr_pt,
                here.position,
                curr_id,
                curr_od,
                here.inner_diameter,
                here.outer_diameter,
            )));
        }

        curr_id = here.inner_diameter;
        curr_od = here.outer_diameter;
        prev = index;
    }

    if segments.is_empty() {
        return Err(PrepError::Degenerate);
    }

    debug!(segments = segments.len(), "prepped pipe");
    Ok(PreppedPipe::new(segments))
}
