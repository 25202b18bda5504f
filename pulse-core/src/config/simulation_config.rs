//! Monte Carlo schedule simulation configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Iterations per project. Default: 1000.
    pub iterations: Option<u32>,
    /// Seed. Default: 42.
    pub seed: Option<u64>,
    /// SPI spread used when history is too short. Default: 0.05.
    pub spi_volatility: Option<f64>,
}

impl SimulationConfig {
    pub fn effective_iterations(&self) -> u32 {
        self.iterations
            .unwrap_or(constants::DEFAULT_SIMULATION_ITERATIONS)
    }

    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(constants::DEFAULT_SIMULATION_SEED)
    }

    pub fn effective_spi_volatility(&self) -> f64 {
        self.spi_volatility
            .unwrap_or(constants::DEFAULT_SPI_VOLATILITY)
    }
}
