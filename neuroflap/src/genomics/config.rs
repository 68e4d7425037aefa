use serde::{Deserialize, Serialize};

/// Configuration data for genome mutation.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Maximum magnitude of a gene's weight.
    pub weight_bound: f32,
    /// Chance that a genome's weights are mutated
    /// during [`Genome::mutate`].
    ///
    /// [`Genome::mutate`]: crate::genomics::Genome::mutate
    pub weight_mutation_chance: f32,
    /// Chance of a single gene's weight being nudged
    /// during weight mutation. Genes that are not
    /// nudged have their weight reset.
    pub weight_nudge_chance: f32,
    /// Magnitude of bound on the weight nudge uniform distribution.
    /// It is assumed to be lesser than [`weight_bound`].
    ///
    /// [`weight_bound`]: GeneticConfig::weight_bound
    pub weight_mutation_power: f32,
    /// Chance of a connection addition mutation.
    pub connection_addition_chance: f32,
    /// Chance of a neuron addition mutation.
    pub neuron_addition_chance: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" configuration.
    /// All values are 0.
    ///
    /// # Note
    /// This value is not suitable for evolution.
    /// It is meant as a way to fill in unused values
    /// during configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::GeneticConfig;
    ///
    /// let cfg = GeneticConfig {
    ///     weight_bound: 1.0,
    ///     neuron_addition_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            weight_bound: 0.0,
            weight_mutation_chance: 0.0,
            weight_nudge_chance: 0.0,
            weight_mutation_power: 0.0,
            connection_addition_chance: 0.0,
            neuron_addition_chance: 0.0,
        }
    }
}

impl Default for GeneticConfig {
    fn default() -> GeneticConfig {
        GeneticConfig {
            weight_bound: 1.0,
            weight_mutation_chance: 0.8,
            weight_nudge_chance: 0.9,
            weight_mutation_power: 0.1,
            connection_addition_chance: 0.03,
            neuron_addition_chance: 0.01,
        }
    }
}
