#![warn(missing_docs)]

//! Boundary mesh generation for the pipe solid.
//!
//! Walks the segments of a [`PreppedPipe`](pipe_kernel_geom::PreppedPipe)
//! from the start cap to the end cap, sampling a circular cross-section
//! ring at every segment boundary and bend step and stitching consecutive
//! rings with wall triangles. Normals are taken from the analytic surfaces,
//! not averaged from the mesh.
//!
//! # Architecture
//!
//! - [`TessellationParams`] - tolerances choosing the sampling density
//! - [`arc_segments`] / [`bend_steps`] - sample counts from the tolerances
//! - [`tessellate`] - build a [`PipeMesh`]
//! - [`PipeMesh`] - shared vertex pool plus polygon faces tagged by [`FaceKind`]
//! - [`TriangleMesh`] - flat triangle arrays for rendering and export

mod mesh;
mod resolution;
mod ring;
mod tessellate;

pub use mesh::{FaceKind, MeshFace, PipeMesh};
pub use resolution::{arc_segments, bend_steps, MAX_ARC_SEGMENTS, MAX_BEND_STEPS};
pub use tessellate::tessellate;

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Tessellation tolerances. A zero entry is unused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Largest distance between the mesh and the true surface.
    pub abs: f64,
    /// Like `abs`, as a fraction of the pipe's overall size.
    pub rel: f64,
    /// Largest angle in radians between neighbouring face normals.
    pub norm: f64,
    /// Points closer than this are merged; radii below it collapse.
    pub dist: f64,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            abs: 0.0,
            rel: 0.01,
            norm: 0.0,
            dist: 0.0005,
        }
    }
}

impl TessellationParams {
    /// Params sampling circles with at least `segments` sides.
    pub fn from_segments(segments: u32) -> Self {
        Self {
            abs: 0.0,
            rel: 0.0,
            // Slightly over π/n so rounding cannot add a side.
            norm: std::f64::consts::PI / f64::from(segments.max(3)) * (1.0 + 1e-9),
            dist: Self::default().dist,
        }
    }
}
