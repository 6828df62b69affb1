//! Core state types for the N-body simulation.
//!
//! A `BodySet` holds the per-body arrays (positions, velocities, masses) in
//! index order. The number of bodies is fixed once the set is built and the
//! masses never change afterwards.

use nalgebra::Vector3;

use crate::error::{Error, Result};

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct BodySet {
    pub positions: Vec<NVec3>,  // N x 3, updated every drift
    pub velocities: Vec<NVec3>, // N x 3, updated every kick
    masses: Vec<f64>,           // N, fixed for the run
}

impl BodySet {
    /// Build a body set, rejecting empty sets, mismatched lengths and
    /// non-positive or non-finite masses
    pub fn new(positions: Vec<NVec3>, velocities: Vec<NVec3>, masses: Vec<f64>) -> Result<Self> {
        let n = masses.len();
        if n == 0 {
            return Err(Error::InvalidParam("body set must contain at least one body".into()));
        }
        if positions.len() != n {
            return Err(Error::ShapeMismatch { what: "positions", expected: n, found: positions.len() });
        }
        if velocities.len() != n {
            return Err(Error::ShapeMismatch { what: "velocities", expected: n, found: velocities.len() });
        }
        if let Some(i) = masses.iter().position(|m| !m.is_finite() || *m <= 0.0) {
            return Err(Error::InvalidParam(format!(
                "mass of body {i} must be finite and > 0, got {}",
                masses[i]
            )));
        }

        Ok(Self { positions, velocities, masses })
    }

    /// Build a body set from plain `[x, y, z]` rows
    pub fn from_rows(positions: &[[f64; 3]], velocities: &[[f64; 3]], masses: &[f64]) -> Result<Self> {
        Self::new(
            positions.iter().map(|p| NVec3::from(*p)).collect(),
            velocities.iter().map(|v| NVec3::from(*v)).collect(),
            masses.to_vec(),
        )
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Always false for a validated set, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Shift velocities into the center-of-mass frame:
    /// `v_i -= mean(m * v) / mean(m)`, which leaves zero total momentum.
    ///
    /// This is an initialization step. The integrator never re-applies it, so
    /// rounding drift of the center of mass over long runs is left alone.
    pub fn to_center_of_mass_frame(&mut self) {
        let n = self.len() as f64;
        let mean_momentum = self
            .velocities
            .iter()
            .zip(&self.masses)
            .fold(NVec3::zeros(), |acc, (v, m)| acc + *v * *m)
            / n;
        let mean_mass = self.total_mass() / n;
        let shift = mean_momentum / mean_mass;

        for v in self.velocities.iter_mut() {
            *v -= shift;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = BodySet::from_rows(&[[0.0; 3], [1.0, 0.0, 0.0]], &[[0.0; 3]], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { what: "velocities", expected: 2, found: 1 }));
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = BodySet::from_rows(&[[0.0; 3], [1.0, 0.0, 0.0]], &[[0.0; 3]; 2], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));

        let err = BodySet::from_rows(&[[0.0; 3]], &[[0.0; 3]], &[-2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
    }

    #[test]
    fn rejects_empty_set() {
        assert!(BodySet::new(vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn center_of_mass_frame_zeroes_momentum() {
        let mut bodies = BodySet::from_rows(
            &[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
            &[[1.0, 0.5, 0.0], [0.0, -2.0, 3.0], [4.0, 0.0, 1.0]],
            &[1.0, 2.0, 3.0],
        )
        .unwrap();
        bodies.to_center_of_mass_frame();

        let p = bodies
            .velocities
            .iter()
            .zip(bodies.masses())
            .fold(NVec3::zeros(), |acc, (v, m)| acc + *v * *m);
        assert!(p.norm() < 1e-12, "momentum not zero: {:?}", p);
    }
}
