use std::time::Instant;

use crate::simulation::forces::{Acceleration, NewtonianGravity, NewtonianGravityParallel};
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodySet, NVec3};
use crate::error::Result;

/// Helper to build a deterministic body set of size `n`, no rand needed
pub fn make_bodies(n: usize) -> Result<BodySet> {
    let positions = (0..n)
        .map(|i| {
            let i_f = i as f64;
            NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            )
        })
        .collect();
    BodySet::new(positions, vec![NVec3::zeros(); n], vec![1.0; n])
}

fn make_params() -> Result<Parameters> {
    Parameters::new(0.1, 0.01, 0.001, 100.0)
}

/// Time one kernel evaluation, direct vs parallel
pub fn bench_gravity() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = make_params()?;

    for n in ns {
        let bodies = make_bodies(n)?;
        let mut out = vec![NVec3::zeros(); n];

        let direct = NewtonianGravity::from_params(&params);
        let parallel = NewtonianGravityParallel::from_params(&params);

        // Warm up
        direct.accelerations_into(&bodies.positions, bodies.masses(), &mut out)?;
        parallel.accelerations_into(&bodies.positions, bodies.masses(), &mut out)?;

        let t0 = Instant::now();
        direct.accelerations_into(&bodies.positions, bodies.masses(), &mut out)?;
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        parallel.accelerations_into(&bodies.positions, bodies.masses(), &mut out)?;
        let dt_parallel = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {:8.6} s, parallel = {:8.6} s", dt_direct, dt_parallel);
    }
    Ok(())
}

/// Average cost of one kick-drift-kick step for each kernel
/// Output is CSV so it can be pasted straight into a spreadsheet
pub fn bench_leapfrog() -> Result<()> {
    println!("N,direct_ms,parallel_ms");

    let params = make_params()?;
    for n in (200..=3200).step_by(200) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 800 { 5 } else { 1 };
        let bodies = make_bodies(n)?;

        let mut direct = Integrator::with_kernel(
            bodies.clone(),
            params,
            Box::new(NewtonianGravity::from_params(&params)),
        )?
        .without_history()
        .with_steps(steps);
        let t0 = Instant::now();
        while direct.step()?.is_some() {}
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let mut parallel = Integrator::with_kernel(
            bodies,
            params,
            Box::new(NewtonianGravityParallel::from_params(&params)),
        )?
        .without_history()
        .with_steps(steps);
        let t1 = Instant::now();
        while parallel.step()?.is_some() {}
        let ms_parallel = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_parallel);
    }
    Ok(())
}
