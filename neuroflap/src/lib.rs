//! A single-species neuroevolution engine for evolving small
//! feed-forward jump controllers, after the NeuroEvolution of
//! Augmenting Topologies algorithm:
//! <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Every genome has the same fixed interface: four scalar
//! sensors plus a bias neuron feeding, directly or through
//! hidden neurons, a single output neuron whose squashed
//! activation is read as a binary decision.
//!
//! There is no speciation. A [`Population`] is evolved by
//! elitism plus tournament selection, crossover and mutation,
//! with a shared [`History`] keeping innovation numbers
//! aligned across lineages.
//!
//! All stochastic operations take an explicit random source,
//! so runs can be reproduced with a seeded engine.
//!
//! # Example usage
//! ```
//! use neuroflap::{Population, PopulationConfig};
//! use neuroflap::genomics::GeneticConfig;
//! use neuroflap::rng::seeded_rng;
//!
//! let mut rng = seeded_rng(42);
//! let mut population = Population::new(
//!     PopulationConfig::default(),
//!     GeneticConfig::default(),
//!     &mut rng,
//! );
//!
//! for _ in 0..10 {
//!     for genome in population.genomes_mut() {
//!         // Reward genomes that decide to jump when low and hold when high.
//!         let fitness = [0.1, 0.9]
//!             .iter()
//!             .filter(|&&y| genome.activate(&[y, 0.5, 0.5, y - 0.5]) == (y > 0.5))
//!             .count();
//!         genome.set_fitness(fitness as f32);
//!     }
//!     if let Err(e) = population.evolve(&mut rng) {
//!         eprintln!("{}", e);
//!         break;
//!     }
//! }
//! assert_eq!(population.generation(), 10);
//! ```

pub mod genomics;
pub mod networks;
mod populations;
pub mod rng;

pub use genomics::Genome;
pub use populations::*;

/// Identifier type used to designate historically
/// identical gene mutations for the purposes of
/// crossover alignment.
pub type Innovation = usize;

/// Identifier type of neurons within a genome.
pub type NeuronId = usize;

/// Number of sensor neurons, which take ids `0..SENSOR_COUNT`.
pub const SENSOR_COUNT: usize = 4;
/// Id of the bias neuron.
pub const BIAS_NEURON: NeuronId = 4;
/// Id of the output neuron.
pub const OUTPUT_NEURON: NeuronId = 5;
/// Id of the first hidden neuron created by mutation.
pub const FIRST_HIDDEN_NEURON: NeuronId = 6;
