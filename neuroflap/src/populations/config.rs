use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

const ONE: NonZeroUsize = match NonZeroUsize::new(1) {
    Some(n) => n,
    None => unreachable!(),
};

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// `elitism_fraction` should be in the range [0.0, 1.0].
/// At least one elite is always kept, whatever its value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Fraction of the population, ranked by fitness,
    /// which is copied as-is to the next generation.
    pub elitism_fraction: f32,
    /// Number of genomes sampled, with replacement,
    /// in each tournament selection.
    pub tournament_size: NonZeroUsize,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(20).unwrap(),
    ///     ..PopulationConfig::zero()
    /// };
    /// assert_eq!(config.elite_count(), 1);
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: ONE,
            elitism_fraction: 0.0,
            tournament_size: ONE,
        }
    }

    /// Number of genomes carried over unmutated on each
    /// evolution: `floor(size × elitism_fraction)`, but
    /// never less than 1 nor more than `size`.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let mut config = PopulationConfig::default();
    /// assert_eq!(config.elite_count(), 5);
    ///
    /// config.size = NonZeroUsize::new(7).unwrap();
    /// assert_eq!(config.elite_count(), 1);
    /// ```
    pub fn elite_count(&self) -> usize {
        let size = self.size.get();
        let elites = (size as f32 * self.elitism_fraction).floor();
        if elites.is_nan() || elites < 1.0 {
            1
        } else {
            (elites as usize).min(size)
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(50).unwrap_or(ONE),
            elitism_fraction: 0.1,
            tournament_size: NonZeroUsize::new(3).unwrap_or(ONE),
        }
    }
}
