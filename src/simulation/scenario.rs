//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - engine settings (`Engine`)
//! - validated numerical parameters (`Parameters`)
//! - the initial body set, already shifted into the center-of-mass frame when
//!   requested
//! - optional render settings
//!
//! Random initial conditions draw positions and velocities from a standard
//! normal distribution with a seeded `StdRng`, so a seed fully determines
//! the bodies.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::configuration::config::{BodyConfig, InitialConfig, RenderConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::simulation::engine::Engine;
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodySet, NVec3};

/// A fully-initialized run: engine, parameters and bodies at t = 0
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub bodies: BodySet,
    pub render: Option<RenderConfig>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let p_cfg = &cfg.parameters;
        let parameters = Parameters::new(p_cfg.G, p_cfg.softening, p_cfg.dt, p_cfg.t_end)?;

        let mut bodies = initial_bodies(&cfg.initial)?;
        if cfg.initial.center_of_mass_frame {
            bodies.to_center_of_mass_frame();
        }

        Ok(Self {
            engine: Engine::from(&cfg.engine),
            parameters,
            bodies,
            render: cfg.render,
        })
    }

    /// Integrator configured from the engine settings. History is not
    /// retained: the binary streams snapshots to the renderer instead.
    pub fn integrator(&self) -> Result<Integrator> {
        let forces = self.engine.kernel.build(&self.parameters);
        Ok(Integrator::with_kernel(self.bodies.clone(), self.parameters, forces)?
            .with_finite_check(self.engine.check_finite)
            .without_history())
    }
}

fn initial_bodies(cfg: &InitialConfig) -> Result<BodySet> {
    match (&cfg.random, &cfg.bodies) {
        (Some(r), None) => random_bodies(r.n, r.total_mass, r.seed),
        (None, Some(list)) => bodies_from_config(list),
        (Some(_), Some(_)) => Err(Error::InvalidParam(
            "initial conditions must give either `random` or `bodies`, not both".into(),
        )),
        (None, None) => Err(Error::InvalidParam(
            "initial conditions need a `random` or `bodies` section".into(),
        )),
    }
}

fn vec3(v: &[f64], what: &'static str) -> Result<NVec3> {
    match v {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(Error::ShapeMismatch { what, expected: 3, found: v.len() }),
    }
}

/// Map `BodyConfig` -> runtime body arrays
pub fn bodies_from_config(list: &[BodyConfig]) -> Result<BodySet> {
    let positions = list.iter().map(|b| vec3(&b.x, "body position")).collect::<Result<Vec<_>>>()?;
    let velocities = list.iter().map(|b| vec3(&b.v, "body velocity")).collect::<Result<Vec<_>>>()?;
    let masses = list.iter().map(|b| b.m).collect();
    BodySet::new(positions, velocities, masses)
}

/// `n` equal-mass bodies (`total_mass / n` each) with standard normal
/// positions and velocities
pub fn random_bodies(n: usize, total_mass: f64, seed: u64) -> Result<BodySet> {
    if n == 0 {
        return Err(Error::InvalidParam("random body count must be > 0".into()));
    }
    if !total_mass.is_finite() || total_mass <= 0.0 {
        return Err(Error::InvalidParam(format!("total_mass must be finite and > 0, got {total_mass}")));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let sample = |rng: &mut StdRng| -> NVec3 {
        NVec3::new(
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
        )
    };

    let positions: Vec<NVec3> = (0..n).map(|_| sample(&mut rng)).collect();
    let velocities: Vec<NVec3> = (0..n).map(|_| sample(&mut rng)).collect();
    let masses = vec![total_mass / n as f64; n];

    BodySet::new(positions, velocities, masses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::config::ScenarioConfig;
    use crate::simulation::diagnostics::total_momentum;
    use crate::visualization::frames::FrameRenderer;

    #[test]
    fn random_bodies_are_reproducible() {
        let a = random_bodies(16, 20.0, 17).unwrap();
        let b = random_bodies(16, 20.0, 17).unwrap();
        let c = random_bodies(16, 20.0, 18).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!((a.total_mass() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn scenario_applies_center_of_mass_frame() {
        let yaml = r#"
parameters: { t_end: 1.0, dt: 0.01, softening: 0.1, G: 1.0 }
initial: { random: { n: 32, total_mass: 20.0, seed: 17 } }
"#;
        let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(yaml).unwrap()).unwrap();
        assert!(total_momentum(&scenario.bodies).norm() < 1e-10);
        assert_eq!(scenario.parameters.n_steps(), 100);
    }

    #[test]
    fn rejects_short_vectors() {
        let yaml = r#"
parameters: { t_end: 1.0, dt: 0.01, softening: 0.1, G: 1.0 }
initial:
  bodies:
    - { x: [0.0, 0.0], v: [0.0, 0.0, 0.0], m: 1.0 }
"#;
        let err = Scenario::build_scenario(ScenarioConfig::from_yaml_str(yaml).unwrap()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn render_settings_are_checked_by_the_renderer() {
        let dir = std::env::temp_dir().join(format!("nbsim-scenario-render-{}", std::process::id()));
        let yaml = format!(
            r#"
parameters: {{ t_end: 1.0, dt: 0.5, softening: 0.1, G: 1.0 }}
initial: {{ random: {{ n: 2, total_mass: 1.0, seed: 1 }} }}
render: {{ dir: "{}", trail: 0, every: 0 }}
"#,
            dir.display()
        );
        let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&yaml).unwrap()).unwrap();
        let mut render = scenario.render.clone().unwrap();
        assert!(FrameRenderer::new(&render, 2).is_err());

        render.every = 1;
        assert!(FrameRenderer::new(&render, 2).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_both_initial_sources() {
        let yaml = r#"
parameters: { t_end: 1.0, dt: 0.01, softening: 0.1, G: 1.0 }
initial:
  random: { n: 2, total_mass: 1.0, seed: 1 }
  bodies:
    - { x: [0.0, 0.0, 0.0], v: [0.0, 0.0, 0.0], m: 1.0 }
"#;
        assert!(Scenario::build_scenario(ScenarioConfig::from_yaml_str(yaml).unwrap()).is_err());
    }
}
