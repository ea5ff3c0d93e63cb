//! # CAMBRIAN
//!
//! NEAT-style neuroevolution engine: speciated populations of augmenting
//! network topologies.
//!
//! ## Features
//!
//! - **Topology and weights**: networks grow neurons and connections through
//!   mutation rather than training a fixed architecture
//! - **Speciated**: an adaptive compatibility threshold protects structural
//!   innovation inside species with shared fitness
//! - **Parallel**: per-genome fitness evaluation fans out via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded random number generation and binary checkpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cambrian::{Evaluator, Evolution, NeatConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // Maximise the summed absolute weight of enabled connections towards 100
//! let evaluator = Evaluator::single(|genome: &cambrian::Genome| {
//!     1000.0 / (genome.enabled_weight_sum() - 100.0).abs().max(1e-9)
//! });
//!
//! let mut evolution =
//!     Evolution::create_optimisation(2, 1, NeatConfig::default(), evaluator).unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! for _ in 0..100 {
//!     evolution.evolve(&mut rng).unwrap();
//! }
//! println!("Best fitness: {:?}", evolution.best_fitness());
//! ```
//!
//! ## Running the champion
//!
//! ```rust,no_run
//! # use cambrian::{Evaluator, Evolution, NeatConfig};
//! use cambrian::phenotype::Network;
//! # let evolution =
//! #     Evolution::create_optimisation(2, 1, NeatConfig::default(),
//! #         Evaluator::single(|_: &cambrian::Genome| 0.0)).unwrap();
//!
//! if let Some(genome) = evolution.fittest() {
//!     let network = Network::sigmoid_output(genome);
//!     let outputs = network.activate(&[1.0, 0.0]).unwrap();
//!     println!("{:?}", outputs);
//! }
//! ```
//!
//! ## Checkpoints
//!
//! ```rust,no_run
//! use cambrian::checkpoint::Checkpoint;
//! use cambrian::{Evaluator, Evolution, Genome, NeatConfig};
//! # let evaluator = Evaluator::single(|_: &Genome| 0.0);
//! # let evolution =
//! #     Evolution::create_optimisation(2, 1, NeatConfig::default(), evaluator).unwrap();
//!
//! evolution.checkpoint().save("run.bin").unwrap();
//!
//! let loaded = Checkpoint::load("run.bin").unwrap();
//! let resumed =
//!     Evolution::from_checkpoint(loaded, Evaluator::single(|_: &Genome| 0.0)).unwrap();
//! ```

pub mod alignment;
pub mod checkpoint;
pub mod config;
pub mod evolution;
pub mod genome;
pub mod innovation;
pub mod phenotype;
pub mod species;

// Re-export main types
pub use config::NeatConfig;
pub use evolution::{Evaluator, Evolution, EvolutionError, GenerationStats};
pub use genome::{ConnectionGene, Genome, NeuronGene, NeuronLayer};
pub use innovation::InnovationGenerator;
pub use phenotype::Network;
pub use species::Species;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
