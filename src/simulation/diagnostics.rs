//! Conserved quantities and sanity checks
//!
//! None of these feed back into the integration. They exist for tests,
//! benchmarks and the integrator's advisory non-finite warning.

use crate::simulation::states::{BodySet, NVec3};

/// `sum 1/2 m v^2`
pub fn kinetic_energy(bodies: &BodySet) -> f64 {
    bodies
        .velocities
        .iter()
        .zip(bodies.masses())
        .map(|(v, m)| 0.5 * m * v.norm_squared())
        .sum()
}

/// Softened pair potential `-G m_i m_j / sqrt(|r|^2 + eps^2)`, summed over
/// unordered pairs. Pairs with zero softened distance contribute nothing,
/// matching the force kernel.
#[allow(non_snake_case)]
pub fn potential_energy(positions: &[NVec3], masses: &[f64], G: f64, eps2: f64) -> f64 {
    let n = positions.len();
    let mut u = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let r = positions[j] - positions[i];
            let d2 = r.norm_squared() + eps2;
            if d2 > 0.0 {
                u -= G * masses[i] * masses[j] / d2.sqrt();
            }
        }
    }
    u
}

#[allow(non_snake_case)]
pub fn total_energy(bodies: &BodySet, G: f64, eps2: f64) -> f64 {
    kinetic_energy(bodies) + potential_energy(&bodies.positions, bodies.masses(), G, eps2)
}

/// `sum m_i v_i`
pub fn total_momentum(bodies: &BodySet) -> NVec3 {
    bodies
        .velocities
        .iter()
        .zip(bodies.masses())
        .fold(NVec3::zeros(), |acc, (v, m)| acc + *v * *m)
}

pub fn center_of_mass(bodies: &BodySet) -> NVec3 {
    let weighted = bodies
        .positions
        .iter()
        .zip(bodies.masses())
        .fold(NVec3::zeros(), |acc, (x, m)| acc + *x * *m);
    weighted / bodies.total_mass()
}

/// `sum m_i a_i`, zero up to rounding for pairwise-symmetric forces
pub fn net_force(accelerations: &[NVec3], masses: &[f64]) -> NVec3 {
    accelerations
        .iter()
        .zip(masses)
        .fold(NVec3::zeros(), |acc, (a, m)| acc + *a * *m)
}

pub fn all_finite(vectors: &[NVec3]) -> bool {
    vectors.iter().all(|v| v.iter().all(|c| c.is_finite()))
}

/// Relative change `|e1 - e0| / |e0|`, falling back to the absolute change
/// when the reference energy is zero
pub fn relative_drift(e0: f64, e1: f64) -> f64 {
    if e0 == 0.0 {
        (e1 - e0).abs()
    } else {
        ((e1 - e0) / e0).abs()
    }
}
