//! Binary body encoding of a pipe.
//!
//! Layout, all big-endian:
//!
//! ```text
//! u32  vertex count
//! per vertex: f64 x, f64 y, f64 z, f64 inner_diameter, f64 outer_diameter, f64 bend_radius
//! ```
//!
//! Record headers and database framing belong to the caller.

use thiserror::Error;

use pipe_kernel_math::{Point3, Transform};

use crate::vertex::PipeVertex;

const COUNT_BYTES: usize = 4;
const VERTEX_BYTES: usize = 6 * 8;

/// Errors from [`import`] and [`export`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// A pipe body needs at least two vertices.
    #[error("pipe body needs at least 2 vertices, got {count}")]
    TooFewVertices {
        /// Vertex count found or supplied.
        count: usize,
    },
    /// The body is shorter than its vertex count requires.
    #[error("pipe body truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// The body is longer than its vertex count requires.
    #[error("pipe body has trailing bytes: expected {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Bytes required.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// The transform's homogeneous scale cannot be divided by.
    #[error("transform scale {0} is not usable")]
    InvalidScale(f64),
}

/// Encode a vertex list, multiplying every value by `local2mm`.
pub fn export(vertices: &[PipeVertex], local2mm: f64) -> Result<Vec<u8>, CodecError> {
    if vertices.len() < 2 {
        return Err(CodecError::TooFewVertices {
            count: vertices.len(),
        });
    }

    let mut data = Vec::with_capacity(COUNT_BYTES + vertices.len() * VERTEX_BYTES);
    data.extend_from_slice(&(vertices.len() as u32).to_be_bytes());
    for v in vertices {
        for value in [
            v.position.x,
            v.position.y,
            v.position.z,
            v.inner_diameter,
            v.outer_diameter,
            v.bend_radius,
        ] {
            data.extend_from_slice(&(value * local2mm).to_be_bytes());
        }
    }
    Ok(data)
}

/// Decode a vertex list, placing it with `transform`.
///
/// Positions go through the full transform. Diameters and bend radii are
/// divided by the transform's homogeneous scale.
pub fn import(bytes: &[u8], transform: &Transform) -> Result<Vec<PipeVertex>, CodecError> {
    let Some(count_bytes) = bytes.get(..COUNT_BYTES) else {
        return Err(CodecError::Truncated {
            expected: COUNT_BYTES,
            actual: bytes.len(),
        });
    };
    let mut count = [0u8; COUNT_BYTES];
    count.copy_from_slice(count_bytes);
    let count = u32::from_be_bytes(count) as usize;

    if count < 2 {
        return Err(CodecError::TooFewVertices { count });
    }

    let expected = COUNT_BYTES + count * VERTEX_BYTES;
    if bytes.len() < expected {
        return Err(CodecError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(CodecError::TrailingBytes {
            expected,
            actual: bytes.len(),
        });
    }

    let scale = transform.homogeneous_scale();
    if scale == 0.0 || !scale.is_finite() {
        return Err(CodecError::InvalidScale(scale));
    }

    let vertices = bytes[COUNT_BYTES..]
        .chunks_exact(VERTEX_BYTES)
        .map(|record| {
            let f: [f64; 6] = std::array::from_fn(|i| {
                let mut word = [0u8; 8];
                word.copy_from_slice(&record[i * 8..i * 8 + 8]);
                f64::from_be_bytes(word)
            });
            PipeVertex::new(
                transform.apply_point(&Point3::new(f[0], f[1], f[2])),
                f[3] / scale,
                f[4] / scale,
                f[5] / scale,
            )
        })
        .collect();
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn elbow() -> Vec<PipeVertex> {
        vec![
            PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 2.0, 3.0),
            PipeVertex::new(Point3::new(10.0, 0.0, 0.0), 0.5, 2.0, 3.0),
            PipeVertex::new(Point3::new(10.0, 10.0, 0.0), 0.0, 2.0, 3.0),
        ]
    }

    #[test]
    fn test_layout() {
        let bytes = export(&elbow(), 1.0).unwrap();
        assert_eq!(bytes.len(), 4 + 3 * 48);
        assert_eq!(&bytes[..4], &[0, 0, 0, 3]);
        // Second vertex x, big-endian.
        assert_eq!(&bytes[4 + 48..4 + 56], &10.0f64.to_be_bytes());
    }

    #[test]
    fn test_roundtrip_is_byte_exact() {
        let bytes = export(&elbow(), 1.0).unwrap();
        let vertices = import(&bytes, &Transform::identity()).unwrap();
        assert_eq!(vertices, elbow());
        assert_eq!(export(&vertices, 1.0).unwrap(), bytes);
    }

    #[test]
    fn test_export_scales_units() {
        let bytes = export(&elbow(), 25.4).unwrap();
        let vertices = import(&bytes, &Transform::identity()).unwrap();
        assert_relative_eq!(vertices[1].position.x, 254.0, max_relative = 1e-12);
        assert_relative_eq!(vertices[1].inner_diameter, 12.7, max_relative = 1e-12);
    }

    #[test]
    fn test_import_applies_transform() {
        let bytes = export(&elbow(), 1.0).unwrap();
        let mut t = Transform::translation(0.0, 0.0, 5.0);
        t.matrix[(3, 3)] = 2.0;
        let vertices = import(&bytes, &t).unwrap();
        // Translation then homogeneous divide.
        assert!((vertices[1].position - Point3::new(5.0, 0.0, 2.5)).norm() < 1e-12);
        assert!((vertices[1].outer_diameter - 1.0).abs() < 1e-12);
        assert!((vertices[1].bend_radius - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_export_refuses_short_lists() {
        assert_eq!(export(&[], 1.0).unwrap_err(), CodecError::TooFewVertices { count: 0 });
        assert_eq!(
            export(&elbow()[..1], 1.0).unwrap_err(),
            CodecError::TooFewVertices { count: 1 }
        );
    }

    #[test]
    fn test_import_errors() {
        let bytes = export(&elbow(), 1.0).unwrap();
        let identity = Transform::identity();
        assert!(matches!(
            import(&bytes[..bytes.len() - 1], &identity),
            Err(CodecError::Truncated { .. })
        ));
        let mut long = bytes.clone();
        long.push(0);
        assert!(matches!(import(&long, &identity), Err(CodecError::TrailingBytes { .. })));
        assert!(matches!(import(&[0, 0], &identity), Err(CodecError::Truncated { .. })));
        assert_eq!(
            import(&[0, 0, 0, 1], &identity).unwrap_err(),
            CodecError::TooFewVertices { count: 1 }
        );
        let mut flat = Transform::identity();
        flat.matrix[(3, 3)] = 0.0;
        assert_eq!(import(&bytes, &flat).unwrap_err(), CodecError::InvalidScale(0.0));
    }
}
