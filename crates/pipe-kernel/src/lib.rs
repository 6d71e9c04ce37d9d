#![warn(missing_docs)]

//! High-level pipe solid facade.
//!
//! Provides the [`PipeSolid`] type, which owns a pipe's control points and
//! the segments prepared from them, and forwards to the geometry, ray
//! tracing and tessellation crates.
//!
//! # Example
//!
//! ```
//! use pipe_kernel::{PipeSolid, Ray, Scratch, TessellationParams};
//! use pipe_kernel_geom::PipeVertex;
//! use pipe_kernel_math::{Point3, Vec3};
//!
//! let solid = PipeSolid::new(vec![
//!     PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 1.0, 2.0, 3.0),
//!     PipeVertex::new(Point3::new(10.0, 0.0, 0.0), 1.0, 2.0, 3.0),
//!     PipeVertex::new(Point3::new(10.0, 10.0, 0.0), 1.0, 2.0, 3.0),
//! ])
//! .unwrap();
//!
//! let ray = Ray::new(Point3::new(5.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
//! let outcome = solid.shoot(&ray, &mut Scratch::new());
//! assert_eq!(outcome.spans().len(), 2);
//!
//! let mesh = solid.to_mesh(&TessellationParams::default());
//! assert!(mesh.is_closed());
//! ```

pub use pipe_kernel_geom;
pub use pipe_kernel_math;
pub use pipe_kernel_raytrace;
pub use pipe_kernel_tessellate;

pub use pipe_kernel_raytrace::{Ray, Scratch, ShotOutcome};
pub use pipe_kernel_tessellate::{PipeMesh, TessellationParams, TriangleMesh};

use std::sync::Arc;

use pipe_kernel_geom::{
    AttrError, CodecError, PipeDefinition, PipeVertex, PrepError, PreppedPipe, Warning,
};
use pipe_kernel_math::{Aabb3, Transform};
use pipe_kernel_raytrace::Diagnostics;
use thiserror::Error;
use tracing::debug;

/// Errors from [`PipeSolid`] operations.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The vertex list cannot be prepared.
    #[error(transparent)]
    Prep(#[from] PrepError),
    /// The binary body is malformed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// An attribute edit was refused.
    #[error(transparent)]
    Attr(#[from] AttrError),
}

/// Result type for pipe operations.
pub type Result<T> = std::result::Result<T, PipeError>;

/// A pipe solid ready for shooting and meshing.
///
/// The prepared segments sit behind an [`Arc`] and are never mutated:
/// editing builds a fresh prepared pipe and swaps it in, so rays already
/// holding the old one (via [`PipeSolid::prepped`]) finish against it.
#[derive(Debug, Clone)]
pub struct PipeSolid {
    vertices: Vec<PipeVertex>,
    prepped: Arc<PreppedPipe>,
    diagnostics: Arc<Diagnostics>,
}

impl PipeSolid {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Prepare a pipe from its control points.
    pub fn new(vertices: Vec<PipeVertex>) -> Result<Self> {
        let prepped = pipe_kernel_geom::prep(&vertices)?;
        Ok(Self {
            vertices,
            prepped: Arc::new(prepped),
            diagnostics: Arc::new(Diagnostics::new()),
        })
    }

    /// Prepare a pipe from a JSON document's contents.
    pub fn from_definition(definition: &PipeDefinition) -> Result<Self> {
        Self::new(definition.vertices.clone())
    }

    /// Decode a binary body, placing it with `transform`.
    pub fn from_bytes(bytes: &[u8], transform: &Transform) -> Result<Self> {
        Self::new(pipe_kernel_geom::import(bytes, transform)?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The control points.
    pub fn vertices(&self) -> &[PipeVertex] {
        &self.vertices
    }

    /// The control points as a JSON-ready document.
    pub fn to_definition(&self) -> PipeDefinition {
        PipeDefinition::new(self.vertices.clone())
    }

    /// Shared handle to the current prepared segments.
    pub fn prepped(&self) -> Arc<PreppedPipe> {
        Arc::clone(&self.prepped)
    }

    /// Failure reporting shared by every shot at the current pipe.
    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /// Axis-aligned bounds of the solid.
    pub fn bounds(&self) -> Aabb3 {
        self.prepped.bounds
    }

    /// Radius of a sphere around the bounds center enclosing the solid.
    pub fn bounding_radius(&self) -> f64 {
        self.prepped.bounding_radius()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Replace the control points and re-prepare.
    ///
    /// On error the solid keeps its previous vertices and segments.
    pub fn set_vertices(&mut self, vertices: Vec<PipeVertex>) -> Result<()> {
        let prepped = pipe_kernel_geom::prep(&vertices)?;
        debug!(
            vertices = vertices.len(),
            segments = prepped.segments.len(),
            "re-prepared pipe"
        );
        self.vertices = vertices;
        self.prepped = Arc::new(prepped);
        self.diagnostics = Arc::new(Diagnostics::new());
        Ok(())
    }

    /// Read a named attribute, or list every vertex when `attr` is `None`.
    pub fn get(&self, attr: Option<&str>) -> Result<String> {
        Ok(pipe_kernel_geom::get(&self.vertices, attr)?)
    }

    /// Apply `(attribute, value)` edits and re-prepare.
    ///
    /// Nothing changes unless every edit applies and the result prepares.
    pub fn adjust(&mut self, edits: &[(&str, &str)]) -> Result<()> {
        let mut vertices = self.vertices.clone();
        pipe_kernel_geom::adjust(&mut vertices, edits)?;
        self.set_vertices(vertices)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Intersect `ray` with the solid using the caller's `scratch`.
    pub fn shoot(&self, ray: &Ray, scratch: &mut Scratch) -> ShotOutcome {
        pipe_kernel_raytrace::shot(&self.prepped, ray, scratch, &self.diagnostics)
    }

    /// Boundary mesh with analytic normals.
    pub fn to_mesh(&self, params: &TessellationParams) -> PipeMesh {
        pipe_kernel_tessellate::tessellate(&self.prepped, params)
    }

    /// Triangulated boundary for rendering or export.
    pub fn to_triangle_mesh(&self, params: &TessellationParams) -> TriangleMesh {
        self.to_mesh(params).to_triangle_mesh()
    }

    /// Structural warnings for the control points.
    pub fn validate(&self) -> Vec<Warning> {
        pipe_kernel_geom::validate(&self.vertices)
    }

    /// Human-readable description, lengths multiplied by `mm2local`.
    pub fn describe(&self, verbose: bool, mm2local: f64) -> String {
        pipe_kernel_geom::describe(&self.vertices, verbose, mm2local)
    }

    /// Encode as a binary body, lengths multiplied by `local2mm`.
    pub fn to_bytes(&self, local2mm: f64) -> Result<Vec<u8>> {
        Ok(pipe_kernel_geom::export(&self.vertices, local2mm)?)
    }
}
