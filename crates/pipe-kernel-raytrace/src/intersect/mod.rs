//! Ray-surface intersection for each kind of pipe surface.
//!
//! Every intersector pushes its candidates into a [`Scratch`](crate::Scratch)
//! and never allocates on its own.

mod bend;
mod linear;
mod plane;

pub use bend::{intersect_bend, IMAGINARY_TOL, PARALLEL_TOL};
pub use linear::intersect_linear;
pub use plane::{
    has_radius_change, intersect_end_cap, intersect_plane, intersect_radius_change,
    intersect_start_cap,
};

pub(crate) use bend::torus_normal;
pub(crate) use linear::wall_normal;
