//! Trajectory storage
//!
//! - [`Snapshot`] borrowed view of one recorded state (step index, time, positions)
//! - [`Trajectory`] full append-only history, `(Nt + 1) x N x 3` positions and `Nt + 1` times
//! - [`TrailBuffer`] bounded ring of the most recent snapshots, for consumers that
//!   only need a sliding window (e.g. drawing trails) and must not grow with the run

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::simulation::states::NVec3;

#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub index: usize,
    pub t: f64,
    pub positions: &'a [NVec3],
}

/// Full position history of a run. Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    snapshots: Vec<Vec<NVec3>>,
}

impl Trajectory {
    pub(crate) fn push(&mut self, snap: Snapshot<'_>) {
        debug_assert_eq!(snap.index, self.snapshots.len());
        self.times.push(snap.t);
        self.snapshots.push(snap.positions.to_vec());
    }

    /// Number of snapshots (`Nt + 1` after a complete run)
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn n_bodies(&self) -> usize {
        self.snapshots.first().map_or(0, Vec::len)
    }

    /// `(snapshots, bodies, 3)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.len(), self.n_bodies(), 3)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn positions(&self, index: usize) -> Option<&[NVec3]> {
        self.snapshots.get(index).map(Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> Option<Snapshot<'_>> {
        Some(Snapshot {
            index,
            t: *self.times.get(index)?,
            positions: self.positions(index)?,
        })
    }

    pub fn last(&self) -> Option<Snapshot<'_>> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = Snapshot<'_>> {
        self.times
            .iter()
            .zip(&self.snapshots)
            .enumerate()
            .map(|(index, (t, p))| Snapshot { index, t: *t, positions: p })
    }

    /// Snapshots `max(end - width, 0) ..= end`, the trail ending at `end`
    pub fn window(&self, end: usize, width: usize) -> &[Vec<NVec3>] {
        if self.is_empty() {
            return &[];
        }
        let end = end.min(self.len() - 1);
        &self.snapshots[end.saturating_sub(width)..=end]
    }

    /// Trajectory of one body across all snapshots
    pub fn body_path(&self, body: usize) -> Vec<NVec3> {
        self.snapshots.iter().filter_map(|s| s.get(body).copied()).collect()
    }
}

/// Ring buffer of the last `capacity` snapshots, oldest evicted first
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    capacity: usize,
    entries: VecDeque<(usize, f64, Vec<NVec3>)>,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidParam("trail buffer capacity must be >= 1".into()));
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        })
    }

    pub fn push(&mut self, snap: Snapshot<'_>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((snap.index, snap.t, snap.positions.to_vec()));
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest retained step index
    pub fn first_index(&self) -> Option<usize> {
        self.entries.front().map(|e| e.0)
    }

    pub fn latest(&self) -> Option<Snapshot<'_>> {
        self.entries.back().map(|(index, t, p)| Snapshot { index: *index, t: *t, positions: p })
    }

    /// Retained snapshots, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Snapshot<'_>> {
        self.entries
            .iter()
            .map(|(index, t, p)| Snapshot { index: *index, t: *t, positions: p })
    }
}
