pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod error;
pub mod logger;

pub use simulation::states::{BodySet, NVec3};
pub use simulation::params::Parameters;
pub use simulation::forces::{Acceleration, KernelKind, NewtonianGravity, NewtonianGravityParallel};
pub use simulation::history::{Snapshot, Trajectory, TrailBuffer};
pub use simulation::integrator::{run, Integrator};
pub use simulation::scenario::{random_bodies, Scenario};

pub use configuration::config::{EngineConfig, KernelConfig, ParametersConfig, BodyConfig, InitialConfig, RandomConfig, RenderConfig, ScenarioConfig};

pub use visualization::frames::{encode_animation, list_frames, numbered_frames, FrameRenderer};

pub use benchmark::benchmark::{bench_gravity, bench_leapfrog};

pub use error::{Error, Result};
