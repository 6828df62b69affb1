//! Fixed-step kick-drift-kick (leapfrog) integrator
//!
//! The [`Integrator`] owns the body state, the current accelerations and the
//! trajectory history. Accelerations are evaluated once at construction and
//! then once per step, so every step costs exactly one kernel call:
//!
//! ```text
//! v += a * dt/2         kick
//! x += v * dt           drift
//! a  = kernel(x, m)     force update
//! v += a * dt/2         kick
//! t += dt
//! record x
//! ```
//!
//! Steps are strictly sequential. Any parallelism lives inside the kernel.

use crate::error::{Error, Result};
use crate::simulation::diagnostics::all_finite;
use crate::simulation::forces::{check_shapes, Acceleration, KernelKind};
use crate::simulation::history::{Snapshot, Trajectory};
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodySet, NVec3};

pub struct Integrator {
    bodies: BodySet,
    params: Parameters,
    forces: Box<dyn Acceleration + Send + Sync>,
    accelerations: Vec<NVec3>, // a_n for the current positions
    t: f64,                    // accumulated time, t += dt per step
    step: usize,               // completed steps
    n_steps: usize,            // Nt
    history: Option<Trajectory>,
    check_finite: bool,
    non_finite_at: Option<usize>,
}

impl Integrator {
    /// Integrator with the direct pairwise kernel and full history retention
    pub fn new(bodies: BodySet, params: Parameters) -> Result<Self> {
        let forces = KernelKind::Direct.build(&params);
        Self::with_kernel(bodies, params, forces)
    }

    /// Validate inputs, evaluate the initial accelerations and record snapshot 0
    pub fn with_kernel(
        bodies: BodySet,
        params: Parameters,
        forces: Box<dyn Acceleration + Send + Sync>,
    ) -> Result<Self> {
        params.validate()?;
        check_shapes(&bodies.positions, bodies.masses())?;
        if bodies.velocities.len() != bodies.len() {
            return Err(Error::ShapeMismatch {
                what: "velocities",
                expected: bodies.len(),
                found: bodies.velocities.len(),
            });
        }

        let accelerations = forces.compute_accelerations(&bodies.positions, bodies.masses())?;
        let n_steps = params.n_steps();

        log::debug!(
            "integrator: {} bodies, {} steps, dt = {}, softening = {}",
            bodies.len(),
            n_steps,
            params.dt,
            params.softening
        );

        let mut integrator = Self {
            bodies,
            params,
            forces,
            accelerations,
            t: 0.0,
            step: 0,
            n_steps,
            history: Some(Trajectory::default()),
            check_finite: true,
            non_finite_at: None,
        };
        integrator.record();
        Ok(integrator)
    }

    /// Override the step count derived from `t_end / dt`
    pub fn with_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Stop retaining snapshots; consumers read them through [`Integrator::step`]
    /// or [`Integrator::run_with`] instead
    pub fn without_history(mut self) -> Self {
        self.history = None;
        self
    }

    /// Enable or disable the advisory non-finite check (on by default)
    pub fn with_finite_check(mut self, enabled: bool) -> Self {
        self.check_finite = enabled;
        self
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn accelerations(&self) -> &[NVec3] {
        &self.accelerations
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.n_steps
    }

    pub fn history(&self) -> Option<&Trajectory> {
        self.history.as_ref()
    }

    pub fn into_history(self) -> Option<Trajectory> {
        self.history
    }

    /// First step whose state contained a NaN or infinity, if the check is on
    pub fn non_finite_at(&self) -> Option<usize> {
        self.non_finite_at
    }

    /// Current state as a snapshot; its time is the sample time `index * dt`
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            index: self.step,
            t: self.step as f64 * self.params.dt,
            positions: &self.bodies.positions,
        }
    }

    /// Advance by one step and return the new snapshot, or `None` once all
    /// `Nt` steps are done
    pub fn step(&mut self) -> Result<Option<Snapshot<'_>>> {
        if self.is_finished() {
            return Ok(None);
        }

        self.kick_drift_kick()?;
        self.step += 1;
        self.record();

        if self.check_finite && self.non_finite_at.is_none() {
            self.check_state();
        }
        if self.is_finished() {
            log::debug!("integrator: finished {} steps at t = {}", self.step, self.t);
        }

        Ok(Some(self.snapshot()))
    }

    /// Run all remaining steps and return the retained history
    pub fn run(&mut self) -> Result<&Trajectory> {
        if self.history.is_none() {
            return Err(Error::InvalidParam(
                "history retention is disabled; use run_with to stream snapshots".into(),
            ));
        }
        while self.step()?.is_some() {}
        self.history
            .as_ref()
            .ok_or_else(|| Error::InvalidParam("history retention is disabled".into()))
    }

    /// Stream the current snapshot and then every following one to `sink`
    /// until the run is complete. The first sink error stops the run.
    pub fn run_with<F>(&mut self, mut sink: F) -> Result<()>
    where
        F: FnMut(Snapshot<'_>) -> Result<()>,
    {
        sink(self.snapshot())?;
        while let Some(snap) = self.step()? {
            sink(snap)?;
        }
        Ok(())
    }

    // helpers ==============================================================================

    fn kick_drift_kick(&mut self) -> Result<()> {
        let dt = self.params.dt; // time step dt
        let half_dt = 0.5 * dt; // half step dt/2

        // Kick: v_n+1/2 = v_n + (dt/2) * a_n
        for (v, a) in self.bodies.velocities.iter_mut().zip(&self.accelerations) {
            *v += half_dt * *a;
        }

        // Drift: x_n+1 = x_n + dt * v_n+1/2
        for (x, v) in self.bodies.positions.iter_mut().zip(&self.bodies.velocities) {
            *x += dt * *v;
        }

        // a_n+1 from x_n+1
        self.forces
            .accelerations_into(&self.bodies.positions, self.bodies.masses(), &mut self.accelerations)?;

        // Second kick: v_n+1 = v_n+1/2 + (dt/2) * a_n+1
        for (v, a) in self.bodies.velocities.iter_mut().zip(&self.accelerations) {
            *v += half_dt * *a;
        }

        self.t += dt;
        Ok(())
    }

    fn record(&mut self) {
        let index = self.step;
        let t = index as f64 * self.params.dt;
        if let Some(history) = self.history.as_mut() {
            history.push(Snapshot { index, t, positions: &self.bodies.positions });
        }
    }

    fn check_state(&mut self) {
        if all_finite(&self.bodies.positions) && all_finite(&self.bodies.velocities) {
            return;
        }
        self.non_finite_at = Some(self.step);
        log::warn!(
            "non-finite position or velocity at step {} (t = {}); values keep propagating",
            self.step,
            self.t
        );
    }
}

/// Integrate `bodies` for exactly `n_steps` steps and return the full history
/// (`n_steps + 1` snapshots, the first equal to the initial positions)
pub fn run(bodies: BodySet, params: Parameters, n_steps: usize) -> Result<Trajectory> {
    let mut integrator = Integrator::new(bodies, params)?.with_steps(n_steps);
    integrator.run()?;
    integrator
        .into_history()
        .ok_or_else(|| Error::InvalidParam("history retention is disabled".into()))
}
