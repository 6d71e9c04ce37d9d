//! Hit types produced by shooting.

use pipe_kernel_math::{Dir3, Point3};

/// Which analytic surface of a segment a hit lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceTag {
    /// Outer cone or outer torus.
    OuterWall,
    /// Inner (bore) cone or inner torus.
    InnerWall,
    /// Closing annulus at the start of the first segment.
    StartCap,
    /// Closing annulus at the end of the last segment.
    EndCap,
    /// Step annulus where the radii of two abutting segments differ.
    RadiusChange,
}

/// Where on its surface a candidate hit lies, enough to evaluate the normal
/// later without re-solving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalHit {
    /// Point on a wall, in the segment's canonical frame.
    Wall(Point3),
    /// Point on a planar annulus with a fixed outward normal.
    Plane {
        /// Outward normal of the annulus.
        outward: Dir3,
    },
}

/// A crossing found by one intersector, before assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateHit {
    /// Signed distance along the ray.
    pub distance: f64,
    /// Index of the segment that produced the hit.
    pub segment: usize,
    /// Surface within that segment.
    pub surface: SurfaceTag,
    /// Surface-local data for the normal evaluator.
    pub local: LocalHit,
}

/// A confirmed crossing with its outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Signed distance along the ray.
    pub distance: f64,
    /// World-space crossing point.
    pub point: Point3,
    /// Outward surface normal.
    pub normal: Dir3,
    /// Index of the segment that produced the hit.
    pub segment: usize,
    /// Surface within that segment.
    pub surface: SurfaceTag,
}

/// One interval of the ray inside the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSpan {
    /// Where the ray enters.
    pub entry: Hit,
    /// Where the ray leaves.
    pub exit: Hit,
}

/// Why an otherwise non-empty hit list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// The nearest hit has its normal along the ray, so it is an exit.
    FirstHitExits,
    /// An unpaired hit remained after pruning.
    OddHitCount {
        /// Number of hits left.
        count: usize,
    },
}

/// Result of shooting one ray at a pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    /// Entry/exit pairs in increasing distance.
    Hit(Vec<HitSpan>),
    /// The ray does not cross the solid.
    Miss,
    /// The hits could not be arranged into entry/exit pairs. Treat as a miss.
    Inconsistent(Inconsistency),
}

impl ShotOutcome {
    /// The spans of a hit, or an empty slice.
    pub fn spans(&self) -> &[HitSpan] {
        match self {
            ShotOutcome::Hit(spans) => spans,
            _ => &[],
        }
    }
}
