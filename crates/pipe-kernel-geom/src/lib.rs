#![warn(missing_docs)]

//! Geometry of the pipe solid.
//!
//! A pipe is an ordered list of [`PipeVertex`] control points, each carrying
//! an inner diameter, an outer diameter and a bend radius. Preparing a pipe
//! ([`prep`]) decomposes it into an ordered run of straight (possibly tapered)
//! [`LinearSegment`]s joined by constant-radius toroidal [`BendSegment`]s.
//!
//! # Architecture
//!
//! - [`vertex`] - control points and the JSON pipe definition
//! - [`segment`] - the prepared segment types and their local frames
//! - [`prep`] - the segment decomposer
//! - [`validate`] - structural checks producing warnings
//! - [`describe`] - human-readable description
//! - [`attr`] - named attribute get/adjust
//! - [`codec`] - the binary body encoding
//!
//! # Example
//!
//! ```
//! use pipe_kernel_geom::{prep, PipeVertex, Segment};
//! use pipe_kernel_math::Point3;
//!
//! let vertices = vec![
//!     PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 2.0, 3.0),
//!     PipeVertex::new(Point3::new(10.0, 0.0, 0.0), 0.0, 2.0, 3.0),
//!     PipeVertex::new(Point3::new(10.0, 10.0, 0.0), 0.0, 2.0, 3.0),
//! ];
//! let pipe = prep(&vertices).unwrap();
//! assert_eq!(pipe.segments.len(), 3);
//! assert!(matches!(pipe.segments[1], Segment::Bend(_)));
//! ```

pub mod attr;
pub mod codec;
pub mod describe;
pub mod prep;
pub mod segment;
pub mod validate;
pub mod vertex;

pub use attr::{adjust, get, AttrError};
pub use codec::{export, import, CodecError};
pub use describe::describe;
pub use prep::{prep, PrepError, LEN_TOL};
pub use segment::{BendSegment, LinearSegment, PreppedPipe, Segment};
pub use validate::{validate, Warning};
pub use vertex::{PipeDefinition, PipeVertex};
