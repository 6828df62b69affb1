//! High-level runtime engine settings
//!
//! Selects the acceleration kernel and whether the advisory non-finite check
//! runs, used when building the integrator for a `Scenario`

use crate::configuration::config::{EngineConfig, KernelConfig};
use crate::simulation::forces::KernelKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub kernel: KernelKind, // direct or parallel
    pub check_finite: bool, // warn once on NaN/Inf
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        let kernel = match cfg.kernel {
            KernelConfig::Direct => KernelKind::Direct,
            KernelConfig::Parallel => KernelKind::Parallel,
        };
        Self { kernel, check_finite: cfg.check_finite }
    }
}
