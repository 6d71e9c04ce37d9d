#![warn(missing_docs)]

//! Analytic ray intersection for the pipe solid.
//!
//! Rays are intersected directly with the exact surfaces of a
//! [`PreppedPipe`](pipe_kernel_geom::PreppedPipe): truncated cones for the
//! straight runs, torus sections for the bends, and planar annuli for the
//! end caps and radius steps.
//!
//! # Architecture
//!
//! - [`Ray`] - ray representation with origin and direction
//! - [`intersect`] - per-surface intersectors producing [`CandidateHit`]s
//! - [`surface_normal`] - outward normal of a candidate
//! - [`assemble`] - sort, de-duplicate and pair candidates into [`HitSpan`]s
//! - [`shot`] - the per-ray entry point
//! - [`Scratch`] - per-thread candidate buffer
//! - [`Diagnostics`] - rate-limited reporting of solver failures
//!
//! # Example
//!
//! ```
//! use pipe_kernel_geom::{prep, PipeVertex};
//! use pipe_kernel_math::{Point3, Vec3};
//! use pipe_kernel_raytrace::{shot, Diagnostics, Ray, Scratch};
//!
//! let pipe = prep(&[
//!     PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 2.0, 0.0),
//!     PipeVertex::new(Point3::new(0.0, 0.0, 10.0), 0.0, 2.0, 0.0),
//! ])
//! .unwrap();
//!
//! let ray = Ray::new(Point3::new(-5.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
//! let mut scratch = Scratch::new();
//! let outcome = shot(&pipe, &ray, &mut scratch, &Diagnostics::new());
//! assert_eq!(outcome.spans().len(), 1);
//! ```

mod assemble;
mod diagnostics;
mod hits;
pub mod intersect;
mod normal;
mod ray;
mod scratch;
mod shot;

pub use assemble::{assemble, DEDUP_DISTANCE};
pub use diagnostics::Diagnostics;
pub use hits::{CandidateHit, Hit, HitSpan, Inconsistency, LocalHit, ShotOutcome, SurfaceTag};
pub use normal::surface_normal;
pub use ray::Ray;
pub use scratch::{Scratch, MAX_CANDIDATES};
pub use shot::shot;
