//! Per-thread candidate storage.

use crate::hits::CandidateHit;

/// Most candidate hits kept for one ray.
///
/// Candidates past the limit are dropped in the order the segments are
/// visited, not by distance, so a truncated shot may pair hits wrongly or
/// come back inconsistent. [`Scratch::dropped`] reports the loss.
pub const MAX_CANDIDATES: usize = 128;

/// Reusable hit buffer for one shooting thread.
///
/// Each thread shooting at a shared pipe owns its own `Scratch`; the buffer
/// is cleared at the start of every shot and keeps its allocation.
#[derive(Debug, Default)]
pub struct Scratch {
    candidates: Vec<CandidateHit>,
    dropped: usize,
}

impl Scratch {
    /// An empty buffer sized for a typical shot.
    pub fn new() -> Self {
        Self {
            candidates: Vec::with_capacity(16),
            dropped: 0,
        }
    }

    /// Candidates gathered by the most recent shot.
    pub fn candidates(&self) -> &[CandidateHit] {
        &self.candidates
    }

    /// Candidates discarded by the most recent shot for lack of room.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub(crate) fn clear(&mut self) {
        self.candidates.clear();
        self.dropped = 0;
    }

    pub(crate) fn push(&mut self, hit: CandidateHit) {
        if self.candidates.len() < MAX_CANDIDATES {
            self.candidates.push(hit);
        } else {
            self.dropped += 1;
        }
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut Vec<CandidateHit> {
        &mut self.candidates
    }
}
