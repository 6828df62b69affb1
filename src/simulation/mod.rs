pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod history;
pub mod integrator;
pub mod diagnostics;
pub mod scenario;
