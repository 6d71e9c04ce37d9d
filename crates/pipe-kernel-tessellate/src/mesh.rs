//! Polygon mesh with a shared vertex pool.

use std::collections::HashMap;

use pipe_kernel_math::{Point3, Vec3};
use tracing::debug;

use crate::TriangleMesh;

/// Which pipe surface a face approximates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// Outer wall of a run or bend.
    OuterWall,
    /// Bore wall of a run or bend.
    InnerWall,
    /// Annulus or disk closing the first vertex.
    StartCap,
    /// Annulus or disk closing the last vertex.
    EndCap,
    /// Annulus where the radii jump between two segments.
    RadiusChange,
}

/// One planar (or nearly planar) polygon, counter-clockwise seen from
/// outside the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFace {
    /// Surface the face lies on.
    pub kind: FaceKind,
    /// Indices into [`PipeMesh::positions`].
    pub vertices: Vec<usize>,
    /// Outward surface normal at each corner.
    pub normals: Vec<Vec3>,
}

/// Boundary mesh of a pipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeMesh {
    /// Shared vertex positions.
    pub positions: Vec<Point3>,
    /// Polygon faces.
    pub faces: Vec<MeshFace>,
}

impl PipeMesh {
    /// Faces of one kind.
    pub fn faces_of(&self, kind: FaceKind) -> impl Iterator<Item = &MeshFace> {
        self.faces.iter().filter(move |f| f.kind == kind)
    }

    /// True if the faces form a closed, consistently oriented surface:
    /// every directed edge is used once and its reverse is used once.
    pub fn is_closed(&self) -> bool {
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &self.faces {
            let n = face.vertices.len();
            for i in 0..n {
                let edge = (face.vertices[i], face.vertices[(i + 1) % n]);
                *edges.entry(edge).or_insert(0) += 1;
            }
        }
        edges
            .iter()
            .all(|(&(a, b), &count)| count == 1 && edges.get(&(b, a)) == Some(&1))
    }

    /// Fan-triangulate into flat arrays.
    ///
    /// A position is emitted once per distinct normal, so creases between
    /// walls and caps stay sharp.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let mut emitted: HashMap<(usize, [i64; 3]), u32> = HashMap::new();

        for face in &self.faces {
            let corners: Vec<u32> = face
                .vertices
                .iter()
                .zip(&face.normals)
                .map(|(&index, normal)| {
                    let key = (index, quantize(normal, 1e-6));
                    *emitted.entry(key).or_insert_with(|| {
                        let p = &self.positions[index];
                        mesh.vertices
                            .extend([p.x as f32, p.y as f32, p.z as f32]);
                        mesh.normals
                            .extend([normal.x as f32, normal.y as f32, normal.z as f32]);
                        (mesh.vertices.len() / 3 - 1) as u32
                    })
                })
                .collect();

            for i in 1..corners.len() - 1 {
                mesh.indices.push(corners[0]);
                mesh.indices.push(corners[i]);
                mesh.indices.push(corners[i + 1]);
            }
        }

        mesh
    }
}

fn quantize(p: &Vec3, quantum: f64) -> [i64; 3] {
    [
        (p.x / quantum).round() as i64,
        (p.y / quantum).round() as i64,
        (p.z / quantum).round() as i64,
    ]
}

/// Accumulates a [`PipeMesh`], merging points that fall in the same
/// `dist`-sized cell.
pub(crate) struct MeshBuilder {
    quantum: f64,
    lookup: HashMap<[i64; 3], usize>,
    mesh: PipeMesh,
}

impl MeshBuilder {
    pub(crate) fn new(dist: f64) -> Self {
        Self {
            quantum: dist.max(1e-9),
            lookup: HashMap::new(),
            mesh: PipeMesh::default(),
        }
    }

    /// Index of `p` in the pool, adding it if no earlier point shares its cell.
    pub(crate) fn vertex(&mut self, p: Point3) -> usize {
        let key = quantize(&p.coords, self.quantum);
        let positions = &mut self.mesh.positions;
        *self.lookup.entry(key).or_insert_with(|| {
            positions.push(p);
            positions.len() - 1
        })
    }

    /// Add a face from `(vertex, normal)` corners.
    ///
    /// Repeated neighbouring corners (a collapsed ring) are dropped; a face
    /// left with fewer than three corners is skipped.
    pub(crate) fn face(&mut self, kind: FaceKind, corners: &[(usize, Vec3)]) {
        let mut kept: Vec<(usize, Vec3)> = Vec::with_capacity(corners.len());
        for &corner in corners {
            if kept.last().map(|k| k.0) != Some(corner.0) {
                kept.push(corner);
            }
        }
        while kept.len() > 1 && kept.first().map(|k| k.0) == kept.last().map(|k| k.0) {
            kept.pop();
        }
        if kept.len() < 3 {
            debug!(?kind, corners = corners.len(), "skipping degenerate face");
            return;
        }

        let (vertices, normals) = kept.into_iter().unzip();
        self.mesh.faces.push(MeshFace {
            kind,
            vertices,
            normals,
        });
    }

    pub(crate) fn finish(self) -> PipeMesh {
        self.mesh
    }
}
