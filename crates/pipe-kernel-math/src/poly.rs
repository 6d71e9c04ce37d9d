//! Polynomial root finding.
//!
//! The quadratic solver serves the cone/cylinder walls. The quartic solver
//! serves the torus and returns all four complex roots, leaving the choice
//! of which nearly-real roots count as crossings to the caller.

pub use nalgebra::Complex;
use thiserror::Error;

/// Failure of the quartic solver.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RootError {
    /// The leading coefficient is zero or not finite.
    #[error("leading coefficient {0} is not a usable quartic coefficient")]
    DegenerateLeadingCoefficient(f64),
    /// The simultaneous iteration did not settle.
    #[error("quartic roots did not converge after {iterations} iterations")]
    NoConvergence {
        /// Iterations run before giving up.
        iterations: usize,
    },
}

const MAX_ITERATIONS: usize = 500;

/// Solve `a*x^2 + b*x + c = 0` for two distinct real roots.
///
/// A zero or negative discriminant yields no roots: a tangent line does
/// not cross the surface. Roots are returned in ascending order.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-12 {
        return Vec::new();
    }

    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return Vec::new();
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    if t1 <= t2 {
        vec![t1, t2]
    } else {
        vec![t2, t1]
    }
}

/// Find all four complex roots of `c[0]*x^4 + c[1]*x^3 + ... + c[4] = 0`.
///
/// Coefficients run from the highest power down. Uses the Aberth-Ehrlich
/// simultaneous iteration, which handles clustered and complex roots
/// without the cancellation problems of the closed-form Ferrari solution.
pub fn solve_quartic(coeffs: &[f64; 5]) -> Result<[Complex<f64>; 4], RootError> {
    let lead = coeffs[0];
    if lead == 0.0 || !lead.is_finite() {
        return Err(RootError::DegenerateLeadingCoefficient(lead));
    }

    // Monic form.
    let c: [f64; 5] = coeffs.map(|x| x / lead);
    if c.iter().any(|x| !x.is_finite()) {
        return Err(RootError::NoConvergence { iterations: 0 });
    }

    // Start on a circle enclosing every root (Cauchy bound), rotated off
    // the real axis so conjugate pairs are not seeded symmetrically.
    let bound = 1.0 + c[1..].iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let mut z: [Complex<f64>; 4] = std::array::from_fn(|k| {
        let angle = std::f64::consts::FRAC_PI_2 * k as f64 + 0.4;
        Complex::new(bound * angle.cos(), bound * angle.sin())
    });
    let mut settled = [false; 4];

    for iteration in 0..MAX_ITERATIONS {
        for k in 0..4 {
            if settled[k] {
                continue;
            }
            let (p, dp, err) = evaluate(&c, z[k]);
            if p.norm() <= err {
                settled[k] = true;
                continue;
            }

            let mut repulsion = Complex::new(0.0, 0.0);
            for j in 0..4 {
                if j != k {
                    repulsion += Complex::new(1.0, 0.0) / (z[k] - z[j]);
                }
            }

            let ratio = p / dp;
            let step = ratio / (Complex::new(1.0, 0.0) - ratio * repulsion);
            if !step.re.is_finite() || !step.im.is_finite() {
                return Err(RootError::NoConvergence {
                    iterations: iteration,
                });
            }
            z[k] -= step;
            if step.norm() <= 1e-15 * (1.0 + z[k].norm()) {
                settled[k] = true;
            }
        }

        if settled.iter().all(|&s| s) {
            return Ok(z);
        }
    }

    Err(RootError::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Horner evaluation of the monic quartic and its derivative at `z`,
/// along with a bound on the rounding error of the value.
fn evaluate(c: &[f64; 5], z: Complex<f64>) -> (Complex<f64>, Complex<f64>, f64) {
    let mut p = Complex::new(c[0], 0.0);
    let mut dp = Complex::new(0.0, 0.0);
    let mut err = c[0].abs();
    let r = z.norm();
    for &coeff in &c[1..] {
        dp = dp * z + p;
        p = p * z + coeff;
        err = err * r + coeff.abs();
    }
    (p, dp, 8.0 * f64::EPSILON * err)
}
