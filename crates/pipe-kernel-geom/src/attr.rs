//! Named attribute access for editors.
//!
//! Attributes are a letter followed by a 0-based vertex index: `V3` is the
//! position of vertex 3, `I3`/`O3` its inner/outer diameter, `R3` its bend
//! radius and `P3` all of it. `N` is the vertex count.

use thiserror::Error;

use pipe_kernel_math::Point3;

use crate::validate::{validate, Warning};
use crate::vertex::PipeVertex;

/// Errors from [`get`] and [`adjust`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttrError {
    /// The attribute letter is not one of `V I O R P N`.
    #[error("unrecognized attribute {0:?}, choices are V, I, O, R, P or N")]
    UnknownAttribute(String),
    /// The attribute has no usable vertex number.
    #[error("no vertex number in attribute {0:?}")]
    MissingIndex(String),
    /// The vertex number is past the end of the list.
    #[error("vertex number {index} out of range (0 - {max})")]
    IndexOutOfRange {
        /// Requested vertex.
        index: usize,
        /// Largest valid vertex number.
        max: usize,
    },
    /// The value does not parse.
    #[error("invalid value {value:?} for {attr}")]
    InvalidValue {
        /// Attribute being set.
        attr: String,
        /// Offending text.
        value: String,
    },
    /// Outer diameters must be positive.
    #[error("outer diameter cannot be 0.0 or less")]
    NonPositiveOuterDiameter,
    /// The edited pipe fails validation.
    #[error("edited pipe is invalid: {}", .0.iter().map(|w| w.to_string()).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<Warning>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Position,
    Inner,
    Outer,
    Bend,
    Vertex,
}

fn parse_attr(attr: &str) -> Result<(Field, usize), AttrError> {
    let mut chars = attr.chars();
    let field = match chars.next() {
        Some('V') => Field::Position,
        Some('I') => Field::Inner,
        Some('O') => Field::Outer,
        Some('R') => Field::Bend,
        Some('P') => Field::Vertex,
        _ => return Err(AttrError::UnknownAttribute(attr.to_string())),
    };
    let index = chars
        .as_str()
        .parse::<usize>()
        .map_err(|_| AttrError::MissingIndex(attr.to_string()))?;
    Ok((field, index))
}

fn format_vertex(index: usize, v: &PipeVertex) -> String {
    format!(
        " V{index} {{ {} {} {} }} I{index} {} O{index} {} R{index} {}",
        v.position.x, v.position.y, v.position.z, v.inner_diameter, v.outer_diameter, v.bend_radius
    )
}

/// Read an attribute, or every vertex when `attr` is `None`.
pub fn get(vertices: &[PipeVertex], attr: Option<&str>) -> Result<String, AttrError> {
    let Some(attr) = attr else {
        let mut out = String::from("pipe");
        for (i, v) in vertices.iter().enumerate() {
            out.push_str(&format_vertex(i, v));
        }
        return Ok(out);
    };

    if attr == "N" {
        return Ok(vertices.len().to_string());
    }

    let (field, index) = parse_attr(attr)?;
    let v = vertices.get(index).ok_or(AttrError::IndexOutOfRange {
        index,
        max: vertices.len().saturating_sub(1),
    })?;

    Ok(match field {
        Field::Position => format!("{} {} {}", v.position.x, v.position.y, v.position.z),
        Field::Inner => v.inner_diameter.to_string(),
        Field::Outer => v.outer_diameter.to_string(),
        Field::Bend => v.bend_radius.to_string(),
        Field::Vertex => format_vertex(index, v),
    })
}

/// Apply `(attribute, value)` edits, then validate.
///
/// Editing vertex `len` appends a copy of the last vertex first. On any
/// error `vertices` is left unchanged.
pub fn adjust(vertices: &mut Vec<PipeVertex>, edits: &[(&str, &str)]) -> Result<(), AttrError> {
    let mut edited = vertices.clone();

    for &(attr, value) in edits {
        let (field, index) = parse_attr(attr)?;
        if index == edited.len() {
            let appended = edited
                .last()
                .copied()
                .unwrap_or_else(|| PipeVertex::new(Point3::origin(), 0.0, 10.0, 20.0));
            edited.push(appended);
        }
        let max = edited.len().saturating_sub(1);
        let v = edited
            .get_mut(index)
            .ok_or(AttrError::IndexOutOfRange { index, max })?;

        let invalid = || AttrError::InvalidValue {
            attr: attr.to_string(),
            value: value.to_string(),
        };
        let number = |s: &str| s.trim().parse::<f64>().map_err(|_| invalid());

        match field {
            Field::Position => {
                let coords = value
                    .split_whitespace()
                    .map(number)
                    .collect::<Result<Vec<_>, _>>()?;
                let [x, y, z] = coords[..] else {
                    return Err(invalid());
                };
                v.position = Point3::new(x, y, z);
            }
            Field::Inner => v.inner_diameter = number(value)?,
            Field::Outer => {
                let od = number(value)?;
                if od <= 0.0 {
                    return Err(AttrError::NonPositiveOuterDiameter);
                }
                v.outer_diameter = od;
            }
            Field::Bend => v.bend_radius = number(value)?,
            Field::Vertex => return Err(AttrError::UnknownAttribute(attr.to_string())),
        }
    }

    let warnings = validate(&edited);
    if !warnings.is_empty() {
        return Err(AttrError::Invalid(warnings));
    }
    *vertices = edited;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elbow() -> Vec<PipeVertex> {
        vec![
            PipeVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 2.0, 3.0),
            PipeVertex::new(Point3::new(10.0, 0.0, 0.0), 0.0, 2.0, 3.0),
            PipeVertex::new(Point3::new(10.0, 10.0, 0.0), 0.0, 2.0, 3.0),
        ]
    }

    #[test]
    fn test_get_single_attributes() {
        let vertices = elbow();
        assert_eq!(get(&vertices, Some("N")).unwrap(), "3");
        assert_eq!(get(&vertices, Some("V1")).unwrap(), "10 0 0");
        assert_eq!(get(&vertices, Some("O2")).unwrap(), "2");
        assert_eq!(get(&vertices, Some("R0")).unwrap(), "3");
        assert_eq!(get(&vertices, Some("P1")).unwrap(), " V1 { 10 0 0 } I1 0 O1 2 R1 3");
    }

    #[test]
    fn test_get_everything() {
        let text = get(&elbow(), None).unwrap();
        assert!(text.starts_with("pipe V0 { 0 0 0 }"));
        assert!(text.ends_with("R2 3"));
    }

    #[test]
    fn test_get_errors() {
        let vertices = elbow();
        assert_eq!(
            get(&vertices, Some("V7")).unwrap_err(),
            AttrError::IndexOutOfRange { index: 7, max: 2 }
        );
        assert!(matches!(get(&vertices, Some("X1")), Err(AttrError::UnknownAttribute(_))));
        assert!(matches!(get(&vertices, Some("V")), Err(AttrError::MissingIndex(_))));
    }

    #[test]
    fn test_adjust_updates_and_appends() {
        let mut vertices = elbow();
        adjust(&mut vertices, &[("V3", "20 10 0"), ("I3", "0.5")]).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3].position, Point3::new(20.0, 10.0, 0.0));
        assert_eq!(vertices[3].inner_diameter, 0.5);
        assert_eq!(vertices[3].outer_diameter, 2.0);
    }

    #[test]
    fn test_adjust_empty_list_uses_defaults() {
        let mut vertices = Vec::new();
        adjust(&mut vertices, &[("V0", "0 0 0"), ("V1", "0 0 100")]).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].outer_diameter, 10.0);
        assert_eq!(vertices[0].bend_radius, 20.0);
    }

    #[test]
    fn test_adjust_empty_list_past_end() {
        let mut vertices = Vec::new();
        let err = adjust(&mut vertices, &[("O3", "4")]).unwrap_err();
        assert_eq!(err, AttrError::IndexOutOfRange { index: 3, max: 0 });
        assert!(vertices.is_empty());
    }

    #[test]
    fn test_adjust_rejects_non_positive_outer() {
        let mut vertices = elbow();
        let err = adjust(&mut vertices, &[("O1", "0")]).unwrap_err();
        assert_eq!(err, AttrError::NonPositiveOuterDiameter);
        assert_eq!(vertices, elbow());
    }

    #[test]
    fn test_adjust_rolls_back_invalid_edit() {
        let mut vertices = elbow();
        let err = adjust(&mut vertices, &[("I1", "5")]).unwrap_err();
        let AttrError::Invalid(warnings) = err else {
            panic!("expected validation failure");
        };
        assert!(matches!(warnings[0], Warning::InnerNotLessThanOuter { index: 1, .. }));
        assert_eq!(vertices, elbow());
    }

    #[test]
    fn test_adjust_incomplete_vertex() {
        let mut vertices = elbow();
        let err = adjust(&mut vertices, &[("V1", "1 2")]).unwrap_err();
        assert!(matches!(err, AttrError::InvalidValue { .. }));
    }
}
