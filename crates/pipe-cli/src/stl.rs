//! Binary STL writer.

use anyhow::{bail, Result};

/// Encode a triangle mesh as binary STL.
///
/// Facet normals are recomputed from the winding.
pub fn export_stl_bytes(vertices: &[f32], indices: &[u32]) -> Result<Vec<u8>> {
    let num_triangles = indices.len() / 3;
    if indices.len() % 3 != 0 {
        bail!("index count {} is not a multiple of 3", indices.len());
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize * 3 + 2 >= vertices.len()) {
        bail!("index {bad} is past the end of {} vertices", vertices.len() / 3);
    }
    let count = u32::try_from(num_triangles)?;

    let mut data = Vec::with_capacity(84 + num_triangles * 50);

    // 80-byte header
    let mut header = [b' '; 80];
    let title = b"pipe STL export";
    header[..title.len()].copy_from_slice(title);
    data.extend_from_slice(&header);
    data.extend_from_slice(&count.to_le_bytes());

    for tri in indices.chunks_exact(3) {
        let corner = |i: u32| {
            let i = i as usize * 3;
            [vertices[i], vertices[i + 1], vertices[i + 2]]
        };
        let (v0, v1, v2) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));

        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let nx = e1[1] * e2[2] - e1[2] * e2[1];
        let ny = e1[2] * e2[0] - e1[0] * e2[2];
        let nz = e1[0] * e2[1] - e1[1] * e2[0];
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        let normal = if len > 1e-10 {
            [nx / len, ny / len, nz / len]
        } else {
            [0.0, 0.0, 1.0]
        };

        for v in [normal, v0, v1, v2] {
            for c in v {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(data)
}
