//! Controller configuration.
//!
//! Every constant steering an [`AgentController`] lives here,
//! grouped by concern. Configurations can be written by hand
//! in RON:
//!
//! ```
//! use neuroflap_agent::AgentConfig;
//!
//! let config = AgentConfig::from_ron(r#"(
//!     viewport: (width: 360.0, height: 640.0),
//!     fitness: (
//!         survival_reward: 1.0,
//!         proximity_reward: 2.0,
//!         proximity_radius: 40.0,
//!         scoring_bonus: 100.0,
//!     ),
//! )"#).unwrap();
//!
//! assert_eq!(config.viewport.height, 640.0);
//! assert_eq!(config.fitness.scoring_bonus, 100.0);
//! // Omitted sections keep their defaults.
//! assert_eq!(config.episodes.max_frames_per_genome, 1000);
//! ```
//!
//! [`AgentController`]: crate::AgentController

use neuroflap::genomics::GeneticConfig;
use neuroflap::PopulationConfig;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error type indicating that a configuration
/// could not be parsed, or holds unusable values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Ron(#[from] ron::Error),
    #[error("{0} must be a probability in [0, 1], got {1}")]
    InvalidProbability(&'static str, f32),
    #[error("{0} must be positive and finite, got {1}")]
    NonPositive(&'static str, f32),
    #[error("{0} must be finite, got {1}")]
    NonFinite(&'static str, f32),
    #[error("{0} must be nonzero")]
    Zero(&'static str),
}

/// Size of the play area, in the same units
/// as the snapshots' positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            width: 400.0,
            height: 800.0,
        }
    }
}

/// Fitness granted to the live genome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Flat reward for every tick survived.
    pub survival_reward: f32,
    /// Maximum per-tick reward for staying level with the
    /// gap center, scaled down linearly to 0 at
    /// `proximity_radius`.
    pub proximity_reward: f32,
    pub proximity_radius: f32,
    /// One-off reward on every score increase.
    pub scoring_bonus: f32,
}

impl FitnessWeights {
    /// Reward for a tick spent at vertical `distance` from the
    /// gap center.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_agent::config::FitnessWeights;
    ///
    /// let weights = FitnessWeights::default();
    /// assert_eq!(weights.tick_reward(0.0), 2.0);
    /// assert_eq!(weights.tick_reward(25.0), 1.5);
    /// assert_eq!(weights.tick_reward(50.0), 1.0);
    /// assert_eq!(weights.tick_reward(f32::NAN), 1.0);
    /// ```
    pub fn tick_reward(&self, distance: f32) -> f32 {
        let radius = self.proximity_radius;
        if distance < radius {
            self.survival_reward + self.proximity_reward * (radius - distance) / radius
        } else {
            self.survival_reward
        }
    }
}

impl Default for FitnessWeights {
    fn default() -> FitnessWeights {
        FitnessWeights {
            survival_reward: 1.0,
            proximity_reward: 1.0,
            proximity_radius: 50.0,
            scoring_bonus: 500.0,
        }
    }
}

/// How obstacles are paired and which pair is targeted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Maximum horizontal offset between a top and a
    /// bottom obstacle of the same pair (exclusive).
    pub pairing_tolerance: f32,
    /// Pairs are still targeted while less than this far
    /// behind the actor.
    pub look_behind: f32,
}

impl Default for SensorConfig {
    fn default() -> SensorConfig {
        SensorConfig {
            pairing_tolerance: 20.0,
            look_behind: 30.0,
        }
    }
}

/// Jump policy constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Generations driven mainly by the gap-seeking heuristic.
    pub heuristic_generations: usize,
    /// The heuristic jumps once the actor is this far below
    /// the gap center.
    pub heuristic_margin: f32,
    /// Per-tick chance of deferring to the network while
    /// the heuristic is in charge.
    pub exploration_chance: f32,
    /// Ticks during which jumps are suppressed after a jump.
    pub jump_cooldown: u32,
    /// Cooldown set by the forced jump near the floor.
    pub safety_cooldown: u32,
    /// Jumps are suppressed above this y.
    pub top_margin: f32,
    /// Jumps are forced below `viewport.height - bottom_margin`.
    pub bottom_margin: f32,
}

impl Default for PolicyConfig {
    fn default() -> PolicyConfig {
        PolicyConfig {
            heuristic_generations: 5,
            heuristic_margin: 20.0,
            exploration_chance: 0.3,
            jump_cooldown: 10,
            safety_cooldown: 5,
            top_margin: 30.0,
            bottom_margin: 70.0,
        }
    }
}

/// Episode lifecycle constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Ticks after which a still-running episode is ended.
    pub max_frames_per_genome: u32,
    /// While no score has ever been reached, a generation is
    /// forced every this many genomes.
    pub stagnation_check_interval: usize,
    /// Consecutive zero-score episodes that trigger a full reset.
    pub stagnation_reset_threshold: u32,
}

impl Default for EpisodeConfig {
    fn default() -> EpisodeConfig {
        EpisodeConfig {
            max_frames_per_genome: 1000,
            stagnation_check_interval: 10,
            stagnation_reset_threshold: 15,
        }
    }
}

/// Complete controller configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub population: PopulationConfig,
    pub genetics: GeneticConfig,
    pub viewport: Viewport,
    pub fitness: FitnessWeights,
    pub sensors: SensorConfig,
    pub policy: PolicyConfig,
    pub episodes: EpisodeConfig,
}

impl AgentConfig {
    /// Parses and validates a configuration written in RON.
    /// Omitted sections take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid
    /// configuration, or if [`validate`] rejects it.
    ///
    /// [`validate`]: AgentConfig::validate
    pub fn from_ron(text: &str) -> Result<AgentConfig, ConfigError> {
        let config: AgentConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::new())?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_agent::{AgentConfig, ConfigError};
    ///
    /// let mut config = AgentConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.policy.exploration_chance = 1.5;
    /// assert!(matches!(
    ///     config.validate(),
    ///     Err(ConfigError::InvalidProbability("policy.exploration_chance", _))
    /// ));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let genetics = &self.genetics;
        for (name, value) in [
            ("population.elitism_fraction", self.population.elitism_fraction),
            ("genetics.weight_mutation_chance", genetics.weight_mutation_chance),
            ("genetics.weight_nudge_chance", genetics.weight_nudge_chance),
            ("genetics.connection_addition_chance", genetics.connection_addition_chance),
            ("genetics.neuron_addition_chance", genetics.neuron_addition_chance),
            ("policy.exploration_chance", self.policy.exploration_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability(name, value));
            }
        }

        for (name, value) in [
            ("genetics.weight_bound", genetics.weight_bound),
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
            ("fitness.proximity_radius", self.fitness.proximity_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive(name, value));
            }
        }

        for (name, value) in [
            ("genetics.weight_mutation_power", genetics.weight_mutation_power),
            ("fitness.survival_reward", self.fitness.survival_reward),
            ("fitness.proximity_reward", self.fitness.proximity_reward),
            ("fitness.scoring_bonus", self.fitness.scoring_bonus),
            ("sensors.pairing_tolerance", self.sensors.pairing_tolerance),
            ("sensors.look_behind", self.sensors.look_behind),
            ("policy.heuristic_margin", self.policy.heuristic_margin),
            ("policy.top_margin", self.policy.top_margin),
            ("policy.bottom_margin", self.policy.bottom_margin),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name, value));
            }
        }

        if self.episodes.max_frames_per_genome == 0 {
            return Err(ConfigError::Zero("episodes.max_frames_per_genome"));
        }
        if self.episodes.stagnation_check_interval == 0 {
            return Err(ConfigError::Zero("episodes.stagnation_check_interval"));
        }
        if self.episodes.stagnation_reset_threshold == 0 {
            return Err(ConfigError::Zero("episodes.stagnation_reset_threshold"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn ron_round_trip() {
        let mut config = AgentConfig::default();
        config.population.size = NonZeroUsize::new(12).unwrap();
        config.policy.jump_cooldown = 7;
        config.viewport.width = 1024.0;

        let text = config.to_ron().unwrap();
        assert_eq!(AgentConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn empty_ron_is_default() {
        assert_eq!(AgentConfig::from_ron("()").unwrap(), AgentConfig::default());
    }

    #[test]
    fn malformed_ron_is_rejected() {
        assert!(matches!(
            AgentConfig::from_ron("(viewport: 3)"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = AgentConfig::default();
        config.genetics.neuron_addition_chance = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability("genetics.neuron_addition_chance", _))
        ));

        let mut config = AgentConfig::default();
        config.viewport.height = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("viewport.height", _))
        ));

        let mut config = AgentConfig::default();
        config.policy.top_margin = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite("policy.top_margin", _))
        ));

        let mut config = AgentConfig::default();
        config.episodes.stagnation_check_interval = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero("episodes.stagnation_check_interval"))
        ));
    }
}
