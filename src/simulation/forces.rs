//! Gravitational acceleration kernels for the n-body engine
//!
//! Both kernels evaluate the same softened Newtonian law
//!
//! ```text
//! a_i = G * sum_{j != i} m_j * r_ij / (|r_ij|^2 + eps^2)^(3/2),   r_ij = x_j - x_i
//! ```
//!
//! with the convention that a pair whose softened squared distance is exactly
//! zero contributes nothing (coincident bodies with zero softening).
//!
//! - [`NewtonianGravity`] walks every unordered pair once and applies the
//!   equal and opposite contribution to both bodies.
//! - [`NewtonianGravityParallel`] splits the work by destination body with
//!   rayon, so every thread only ever writes its own `a_i`.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::simulation::params::Parameters;
use crate::simulation::states::NVec3;

/// Trait for acceleration sources operating on positions and masses
pub trait Acceleration {
    /// Overwrite `out[i]` with the acceleration of body `i`.
    /// `positions`, `masses` and `out` must all have the same length.
    fn accelerations_into(&self, positions: &[NVec3], masses: &[f64], out: &mut [NVec3]) -> Result<()>;

    /// Allocating form of [`Acceleration::accelerations_into`]
    fn compute_accelerations(&self, positions: &[NVec3], masses: &[f64]) -> Result<Vec<NVec3>> {
        let mut out = vec![NVec3::zeros(); positions.len()];
        self.accelerations_into(positions, masses, &mut out)?;
        Ok(out)
    }
}

pub fn check_shapes(positions: &[NVec3], masses: &[f64]) -> Result<()> {
    if masses.is_empty() {
        return Err(Error::InvalidParam("at least one body is required".into()));
    }
    if positions.len() != masses.len() {
        return Err(Error::ShapeMismatch {
            what: "positions",
            expected: masses.len(),
            found: positions.len(),
        });
    }
    Ok(())
}

/// [`check_shapes`] plus the output buffer length
fn check_output(positions: &[NVec3], masses: &[f64], out: &[NVec3]) -> Result<()> {
    check_shapes(positions, masses)?;
    if out.len() != positions.len() {
        return Err(Error::ShapeMismatch {
            what: "output",
            expected: positions.len(),
            found: out.len(),
        });
    }
    Ok(())
}

/// `1 / (r2 + eps2)^(3/2)`, or zero when the softened distance vanishes
#[inline]
pub fn inv_r3(r2: f64, eps2: f64) -> f64 {
    let d2 = r2 + eps2;
    if d2 > 0.0 {
        let inv_r = d2.sqrt().recip();
        inv_r * inv_r * inv_r
    } else {
        0.0
    }
}

/// Direct O(N^2) Newtonian gravity, one evaluation per unordered pair
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub G: f64,    // gravitational constant
    pub eps2: f64, // softening length squared
}

impl NewtonianGravity {
    pub fn from_params(p: &Parameters) -> Self {
        Self { G: p.G, eps2: p.eps2() }
    }
}

impl Acceleration for NewtonianGravity {
    fn accelerations_into(&self, positions: &[NVec3], masses: &[f64], out: &mut [NVec3]) -> Result<()> {
        check_output(positions, masses, out)?;
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }

        let n = positions.len();
        for i in 0..n {
            let xi = positions[i];
            let mi = masses[i];

            for j in (i + 1)..n {
                // r points from i to j: i is pulled along +r, j along -r
                let r = positions[j] - xi;
                let coef = self.G * inv_r3(r.dot(&r), self.eps2);

                out[i] += coef * masses[j] * r;
                out[j] -= coef * mi * r;
            }
        }
        Ok(())
    }
}

/// Same law as [`NewtonianGravity`], parallel over destination bodies.
///
/// Every pair is evaluated twice (once from each side), trading the symmetry
/// saving for race-free writes. Each `a_i` is summed in body order, so results
/// do not depend on the thread count.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravityParallel {
    pub G: f64,
    pub eps2: f64,
}

impl NewtonianGravityParallel {
    pub fn from_params(p: &Parameters) -> Self {
        Self { G: p.G, eps2: p.eps2() }
    }
}

impl Acceleration for NewtonianGravityParallel {
    fn accelerations_into(&self, positions: &[NVec3], masses: &[f64], out: &mut [NVec3]) -> Result<()> {
        check_output(positions, masses, out)?;
        out.par_iter_mut().enumerate().for_each(|(i, a)| {
            let xi = positions[i];
            let mut acc = NVec3::zeros();
            for (j, (xj, mj)) in positions.iter().zip(masses).enumerate() {
                if j == i {
                    continue;
                }
                let r = xj - xi;
                acc += inv_r3(r.dot(&r), self.eps2) * *mj * r;
            }
            *a = self.G * acc;
        });
        Ok(())
    }
}

/// Which kernel the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelKind {
    #[default]
    Direct,
    Parallel,
}

impl KernelKind {
    /// Boxed kernel configured from the run parameters
    pub fn build(self, p: &Parameters) -> Box<dyn Acceleration + Send + Sync> {
        match self {
            KernelKind::Direct => Box::new(NewtonianGravity::from_params(p)),
            KernelKind::Parallel => Box::new(NewtonianGravityParallel::from_params(p)),
        }
    }
}
