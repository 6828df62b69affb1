//! Numerical and physical parameters for a run
//!
//! `Parameters` is immutable once validated and is handed to the integrator at
//! construction:
//! - gravitational constant `G` and softening length,
//! - time step `dt` and end time `t_end` (which fix the step count).

use crate::error::{Error, Result};

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub G: f64,         // gravitational constant
    pub softening: f64, // softening length (not squared)
    pub dt: f64,        // time step
    pub t_end: f64,     // time end
}

impl Parameters {
    #[allow(non_snake_case)]
    pub fn new(G: f64, softening: f64, dt: f64, t_end: f64) -> Result<Self> {
        let p = Self { G, softening, dt, t_end };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.G.is_finite() {
            return Err(Error::InvalidParam(format!("G must be finite, got {}", self.G)));
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(Error::InvalidParam(format!(
                "softening must be finite and >= 0, got {}",
                self.softening
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidParam(format!("dt must be finite and > 0, got {}", self.dt)));
        }
        if !self.t_end.is_finite() || self.t_end <= 0.0 {
            return Err(Error::InvalidParam(format!("t_end must be finite and > 0, got {}", self.t_end)));
        }
        Ok(())
    }

    /// Softening squared, the term added to every squared separation
    pub fn eps2(&self) -> f64 {
        self.softening * self.softening
    }

    /// Number of steps `Nt = ceil(t_end / dt)`
    pub fn n_steps(&self) -> usize {
        (self.t_end / self.dt).ceil() as usize
    }
}
