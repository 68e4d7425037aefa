use crate::genomics::GeneticConfig;
use crate::rng;
use crate::{Innovation, NeuronId};

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Genes are the weighted, directed edges of a genome.
/// They are created between two neurons, and become
/// connections in the genome's phenotype while enabled.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    id: Innovation,
    source: NeuronId,
    target: NeuronId,
    weight: f32,
    enabled: bool,
}

impl Gene {
    /// Returns a new _enabled_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 0.5);
    /// assert!(gene.enabled());
    /// ```
    pub fn new(id: Innovation, source: NeuronId, target: NeuronId, weight: f32) -> Gene {
        Gene {
            id,
            source,
            target,
            weight,
            enabled: true,
        }
    }

    /// Returns a random weight, uniformly
    /// distributed over ±`config.weight_bound`.
    pub(crate) fn random_weight<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> f32 {
        rng::symmetric(rng, config.weight_bound)
    }

    /// Resets the gene's weight to a uniformly random
    /// value in ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub fn randomize_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        self.weight = Self::random_weight(config, rng);
    }

    /// Nudges the gene's weight by a uniformly random amount
    /// in ±[`weight_mutation_power`], then clamps it into
    /// ±[`weight_bound`].
    ///
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{Gene, GeneticConfig};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut gene = Gene::new(0, 0, 5, 0.99);
    /// let config = GeneticConfig::default();
    /// gene.nudge_weight(&config, &mut seeded_rng(3));
    ///
    /// assert!((gene.weight() - 0.99).abs() <= config.weight_mutation_power);
    /// assert!(gene.weight().abs() <= config.weight_bound);
    /// ```
    pub fn nudge_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        self.weight += rng::symmetric(rng, config.weight_mutation_power);
        self.weight = self.weight.clamp(-config.weight_bound, config.weight_bound);
    }

    /// Returns the gene's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns the id of the neuron the gene starts at.
    pub fn source(&self) -> NeuronId {
        self.source
    }

    /// Returns the id of the neuron the gene ends at.
    pub fn target(&self) -> NeuronId {
        self.target
    }

    /// Returns the gene's `(source, target)` pair.
    pub fn endpoints(&self) -> (NeuronId, NeuronId) {
        (self.source, self.target)
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Sets the gene's weight. No clamping is applied.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::Gene;
    ///
    /// let mut gene = Gene::new(42, 3, 9, 0.5);
    /// gene.set_weight(-1.0);
    /// assert_eq!(gene.weight(), -1.0);
    /// ```
    pub fn set_weight(&mut self, w: f32) {
        self.weight = w;
    }

    /// Returns whether the gene is expressed in the phenotype.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the gene's expression status.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}[{:?}->{:?}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.id,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
