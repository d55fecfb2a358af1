//! Error types for the simulation core.
//!
//! All three variants are fatal for the update path: a biased or silently
//! repaired sample corrupts the stationary distribution without any outward
//! symptom, so the run aborts and any retry policy is the caller's decision
//! (made with fresh seeds, to keep the chain reproducible).

use thiserror::Error;

/// Errors surfaced by the Monte Carlo update path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Invalid geometry or action parameters, rejected at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A link matrix failed the unitarity check beyond tolerance after an
    /// update. Indicates an RNG or algorithm bug; never silently corrected.
    #[error("link ({site}, {direction}) left SU(3): deviation {deviation:.3e}")]
    NumericalDivergence {
        site: usize,
        direction: usize,
        deviation: f64,
    },

    /// Heatbath rejection sampling exceeded the configured attempt bound.
    #[error("heatbath sampling at link ({site}, {direction}) exhausted {attempts} attempts")]
    SamplingExhaustion {
        site: usize,
        direction: usize,
        attempts: usize,
    },
}
