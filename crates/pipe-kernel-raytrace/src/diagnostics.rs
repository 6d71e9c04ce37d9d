//! Rate-limited reporting of solver failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pipe_kernel_math::RootError;
use tracing::{debug, warn};

use crate::ray::Ray;

/// Failure reporting for one prepared pipe.
///
/// The first root-solver failure is logged at `warn` with the full ray;
/// later ones only at `debug`. Shared between shooting threads.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reported: AtomicBool,
    failures: AtomicUsize,
}

impl Diagnostics {
    /// Fresh state with nothing reported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the torus quartic for `segment` could not be solved.
    pub fn root_solver_failed(&self, ray: &Ray, segment: usize, error: &RootError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        if self.reported.swap(true, Ordering::Relaxed) {
            debug!(segment, %error, "bend root solver failed");
        } else {
            warn!(
                segment,
                %error,
                origin = ?ray.origin,
                direction = ?ray.direction.as_ref(),
                "bend root solver failed, treating segment as a miss"
            );
        }
    }

    /// Whether any failure has been reported.
    pub fn has_reported(&self) -> bool {
        self.reported.load(Ordering::Relaxed)
    }

    /// Number of failures seen.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe_kernel_math::{Point3, Vec3};

    #[test]
    fn test_reports_once_and_counts() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_reported());

        let ray = Ray::new(Point3::origin(), Vec3::x());
        let error = RootError::NoConvergence { iterations: 500 };
        diagnostics.root_solver_failed(&ray, 1, &error);
        diagnostics.root_solver_failed(&ray, 3, &error);

        assert!(diagnostics.has_reported());
        assert_eq!(diagnostics.failure_count(), 2);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = Diagnostics::new();
        let b = Diagnostics::new();
        let ray = Ray::new(Point3::origin(), Vec3::z());
        a.root_solver_failed(&ray, 0, &RootError::DegenerateLeadingCoefficient(0.0));
        assert!(a.has_reported());
        assert!(!b.has_reported());
    }
}
