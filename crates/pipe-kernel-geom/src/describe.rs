//! Human-readable description of a pipe.

use crate::vertex::PipeVertex;

/// Describe a pipe.
///
/// The first line gives the vertex count. With `verbose`, every vertex is
/// listed with its bend radius, diameters and position, all multiplied by
/// `mm2local` to convert to the caller's display units.
pub fn describe(vertices: &[PipeVertex], verbose: bool, mm2local: f64) -> String {
    let mut out = format!("pipe with {} points\n", vertices.len());
    if !verbose {
        return out;
    }

    let g = |x: f64| format_g(snap_to_integer(x * mm2local));
    for (i, v) in vertices.iter().enumerate() {
        out.push_str(&format!(
            "\t{i} \tbend radius = {}  od={}",
            g(v.bend_radius),
            g(v.outer_diameter)
        ));
        if v.inner_diameter > 0.0 {
            out.push_str(&format!(", id  = {}", g(v.inner_diameter)));
        }
        out.push_str(&format!(
            "\n\t  at=({}, {}, {})\n",
            g(v.position.x),
            g(v.position.y),
            g(v.position.z)
        ));
    }
    out
}

fn snap_to_integer(x: f64) -> f64 {
    let r = x.round();
    if (x - r).abs() < 1e-9 {
        r
    } else {
        x
    }
}

/// Format like C's `%g`: six significant digits, trailing zeros removed,
/// scientific notation for very large or very small magnitudes.
pub(crate) fn format_g(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }

    // Round to six significant digits first so the exponent reflects carries.
    let sci = format!("{x:.5e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..6).contains(&exp) {
        let mantissa = trim_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
