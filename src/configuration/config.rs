//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – kernel choice and diagnostics
//! - [`ParametersConfig`] – time stepping and physical constants
//! - [`InitialConfig`]    – explicit bodies or seeded random sampling
//! - [`RenderConfig`]     – optional frame output
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   kernel: "direct"        # or "parallel"
//!   check_finite: true
//!
//! parameters:
//!   t_end: 10.0             # total simulation time
//!   dt: 0.01                # fixed step size
//!   softening: 0.1          # softening length
//!   G: 1.0                  # gravitational constant
//!
//! initial:
//!   center_of_mass_frame: true
//!   random:
//!     n: 100
//!     total_mass: 20.0
//!     seed: 17
//!
//! render:
//!   dir: "images"
//!   trail: 50
//!   extent: 2.0
//!   size: 800
//!   every: 1
//!   animation: "nbody.gif"  # optional, assembled after the run
//!   fps: 20
//! ```
//!
//! Instead of `random`, `initial` may list the bodies explicitly:
//!
//! ```yaml
//! initial:
//!   bodies:
//!     - x: [ -1.0, 0.0, 0.0 ]
//!       v: [  0.0, 0.5, 0.0 ]
//!       m: 1.0
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Which acceleration kernel the engine uses
/// `kernel: "direct"` or `kernel: "parallel"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelConfig {
    #[serde(rename = "direct")] // Pairwise loop over i < j, single thread
    #[default]
    Direct,

    #[serde(rename = "parallel")] // Rayon, one task per destination body
    Parallel,
}

fn default_true() -> bool {
    true
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub kernel: KernelConfig, // Acceleration kernel
    #[serde(default = "default_true")]
    pub check_finite: bool, // Warn once when NaN/Inf shows up in the state
}

// used when the whole `engine:` section is omitted
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::Direct,
            check_finite: true,
        }
    }
}

/// Time stepping and physical constants
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64,     // time end
    pub dt: f64,        // time step size
    pub softening: f64, // softening length, prevents singular forces at tiny separations
    pub G: f64,         // gravitational constant
}

/// Initial state for a single body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // Initial position [x, y, z]
    pub v: Vec<f64>, // Initial velocity [vx, vy, vz]
    pub m: f64,      // Mass, must be > 0
}

/// Seeded random initial conditions
#[derive(Deserialize, Debug, Clone)]
pub struct RandomConfig {
    pub n: usize,        // Number of bodies
    pub total_mass: f64, // Shared equally between bodies
    pub seed: u64,       // Same seed -> same bodies
}

#[derive(Deserialize, Debug, Clone)]
pub struct InitialConfig {
    #[serde(default = "default_true")]
    pub center_of_mass_frame: bool, // Zero the total momentum before the run
    pub random: Option<RandomConfig>,
    pub bodies: Option<Vec<BodyConfig>>,
}

/// Frame output settings; omit the section to skip rendering
#[derive(Deserialize, Debug, Clone)]
pub struct RenderConfig {
    pub dir: String, // Output directory for PNG frames
    #[serde(default = "RenderConfig::default_trail")]
    pub trail: usize, // Snapshots drawn as a trail behind each body
    #[serde(default = "RenderConfig::default_extent")]
    pub extent: f64, // Viewport is [-extent, extent] in x and y
    #[serde(default = "RenderConfig::default_size")]
    pub size: u32, // Square image edge in pixels
    #[serde(default = "RenderConfig::default_every")]
    pub every: usize, // Render every n-th step (the last step is always rendered)
    #[serde(default)]
    pub animation: Option<String>, // GIF assembled from the frames after the run
    #[serde(default = "RenderConfig::default_fps")]
    pub fps: u32, // Animation frame rate
}

impl RenderConfig {
    fn default_trail() -> usize {
        50
    }
    fn default_extent() -> f64 {
        2.0
    }
    fn default_size() -> u32 {
        800
    }
    fn default_every() -> usize {
        1
    }
    fn default_fps() -> u32 {
        20
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub initial: InitialConfig,
    pub render: Option<RenderConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_random_scenario_with_defaults() {
        let yaml = r#"
parameters:
  t_end: 10.0
  dt: 0.01
  softening: 0.1
  G: 1.0
initial:
  random:
    n: 100
    total_mass: 20.0
    seed: 17
render:
  dir: images
"#;
        let cfg = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.engine.kernel, KernelConfig::Direct);
        assert!(cfg.engine.check_finite);
        assert!(cfg.initial.center_of_mass_frame);
        assert_eq!(cfg.initial.random.as_ref().map(|r| r.n), Some(100));
        let render = cfg.render.unwrap();
        assert_eq!(render.trail, 50);
        assert_eq!(render.extent, 2.0);
        assert_eq!(render.every, 1);
        assert!(render.animation.is_none());
        assert_eq!(render.fps, 20);
    }

    #[test]
    fn empty_engine_section_keeps_finite_check() {
        let yaml = r#"
engine: {}
parameters: { t_end: 1.0, dt: 0.1, softening: 0.0, G: 1.0 }
initial: { random: { n: 2, total_mass: 1.0, seed: 1 } }
"#;
        let cfg = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert!(cfg.engine.check_finite);
        assert!(EngineConfig::default().check_finite);
        assert_eq!(EngineConfig::default().kernel, KernelConfig::Direct);
    }

    #[test]
    fn parses_explicit_bodies() {
        let yaml = r#"
engine:
  kernel: parallel
  check_finite: false
parameters: { t_end: 1.0, dt: 0.1, softening: 0.0, G: 1.0 }
initial:
  center_of_mass_frame: false
  bodies:
    - { x: [-1.0, 0.0, 0.0], v: [0.0, 0.0, 0.0], m: 1.0 }
    - { x: [ 1.0, 0.0, 0.0], v: [0.0, 0.0, 0.0], m: 1.0 }
"#;
        let cfg = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.engine.kernel, KernelConfig::Parallel);
        assert!(!cfg.engine.check_finite);
        assert_eq!(cfg.initial.bodies.as_ref().map(Vec::len), Some(2));
        assert!(cfg.render.is_none());
    }

    #[test]
    fn unknown_kernel_is_rejected() {
        let yaml = r#"
engine: { kernel: tree }
parameters: { t_end: 1.0, dt: 0.1, softening: 0.0, G: 1.0 }
initial: { random: { n: 2, total_mass: 1.0, seed: 1 } }
"#;
        assert!(ScenarioConfig::from_yaml_str(yaml).is_err());
    }
}
