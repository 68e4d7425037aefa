//! The episode controller: plays every genome of a population
//! in turn, one episode each, and evolves the population once
//! all have played.

use crate::config::{AgentConfig, ConfigError};
use crate::sensors::{self, ObstaclePair};
use crate::state::{GameState, Position};
use crate::telemetry::Telemetry;

use neuroflap::networks::FeedForwardNetwork;
use neuroflap::rng::{self, Chance, DefaultRng};
use neuroflap::{Population, SENSOR_COUNT};

use log::{debug, error, info, trace, warn};
use rand::Rng;

/// The genome currently playing, and its compiled network.
#[derive(Clone, Debug)]
struct LiveGenome {
    index: usize,
    network: FeedForwardNetwork,
}

/// Drives a [`Population`] through a side-scrolling game,
/// deciding once per tick whether the actor jumps.
///
/// # Examples
/// ```
/// use neuroflap_agent::{AgentConfig, AgentController};
/// use neuroflap_agent::state::{GameState, Obstacle, Position};
/// use rand_xoshiro::rand_core::SeedableRng;
/// use rand_xoshiro::Xoshiro256StarStar;
///
/// let mut controller = AgentController::with_rng(
///     AgentConfig::default(),
///     Xoshiro256StarStar::seed_from_u64(0),
/// ).unwrap();
///
/// let state = GameState::new(
///     Position::new(50.0, 400.0),
///     vec![
///         Obstacle { position: Position::new(300.0, 100.0), is_top: true, height: 300.0, width: 60.0 },
///         Obstacle { position: Position::new(300.0, 700.0), is_top: false, height: 300.0, width: 60.0 },
///     ],
/// );
///
/// // The first tick only picks a genome.
/// assert!(!controller.process_game_state(&state));
/// assert_eq!(controller.genome_index(), 1);
///
/// for _ in 0..100 {
///     let _jump = controller.process_game_state(&state);
/// }
/// assert!(controller.current_fitness() >= 100.0);
///
/// controller.handle_game_over();
/// assert_eq!(controller.genome_index(), 2);
/// ```
pub struct AgentController<R = DefaultRng> {
    config: AgentConfig,
    population: Population,
    live: Option<LiveGenome>,
    cursor: usize,
    frame_count: u32,
    jump_cooldown: u32,
    episode_score: u32,
    best_score: u32,
    zero_score_streak: u32,
    genomes_evaluated: u64,
    rng: R,
}

impl AgentController<DefaultRng> {
    /// Creates a controller seeded from system entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AgentConfig) -> Result<AgentController<DefaultRng>, ConfigError> {
        AgentController::with_rng(config, rng::entropy_rng())
    }
}

impl<R: Rng> AgentController<R> {
    /// Creates a controller drawing all its randomness
    /// from `rng`. Seeded engines give reproducible runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_rng(config: AgentConfig, mut rng: R) -> Result<AgentController<R>, ConfigError> {
        config.validate()?;
        let population = Population::new(
            config.population.clone(),
            config.genetics.clone(),
            &mut rng,
        );
        info!("created population of {} genomes", population.size());
        Ok(AgentController {
            config,
            population,
            live: None,
            cursor: 0,
            frame_count: 0,
            jump_cooldown: 0,
            episode_score: 0,
            best_score: 0,
            zero_score_streak: 0,
            genomes_evaluated: 0,
            rng,
        })
    }

    /// Makes the next genome of the population live, evolving
    /// the population first if every genome has played.
    ///
    /// The genome starts its episode with zero fitness and score.
    pub fn start_next_genome(&mut self) {
        if self.cursor >= self.population.len() {
            self.evolve_population();
            self.cursor = 0;
        }

        let index = self.cursor;
        let network = match self.population.genome_mut(index) {
            Some(genome) => {
                genome.set_fitness(0.0);
                genome.set_score(0);
                FeedForwardNetwork::from(&*genome)
            }
            None => {
                error!("no genome at position {} to start", index);
                self.live = None;
                return;
            }
        };

        self.live = Some(LiveGenome { index, network });
        self.cursor += 1;
        self.frame_count = 0;
        self.episode_score = 0;
        self.jump_cooldown = 0;
        self.genomes_evaluated += 1;

        debug!(
            "starting genome {} of {} (generation {}), {} evaluated in total",
            self.cursor,
            self.population.len(),
            self.generation(),
            self.genomes_evaluated
        );
    }

    /// Decides whether the actor jumps on this tick, and
    /// rewards the live genome for surviving it.
    ///
    /// Ends the episode, returning `false`, once the live
    /// genome has played [`max_frames_per_genome`] ticks.
    ///
    /// [`max_frames_per_genome`]: crate::config::EpisodeConfig::max_frames_per_genome
    pub fn process_game_state(&mut self, state: &GameState) -> bool {
        if self.live.is_none() {
            self.start_next_genome();
            return false;
        }

        if let Some(score) = state.actor.score {
            self.update_score(score);
        }

        self.frame_count += 1;
        if self.frame_count > self.config.episodes.max_frames_per_genome {
            warn!(
                "genome {} timed out after {} frames",
                self.cursor, self.frame_count
            );
            self.handle_game_over();
            return false;
        }

        let actor = state.actor.position;
        let pair = match sensors::resolve_target(&state.obstacles, actor.x, &self.config.sensors) {
            Some(pair) => pair,
            None => {
                trace!("no obstacle pair ahead, falling back to height");
                return actor.y.is_finite() && actor.y > self.config.viewport.height / 2.0;
            }
        };

        let inputs = sensors::sensor_values(actor, &pair, &self.config.viewport);
        trace!("sensors {:?} towards {:?}", inputs, pair);

        self.reward_tick(actor, &pair);

        if self.jump_cooldown > 0 {
            self.jump_cooldown -= 1;
        }

        let mut jump = self.policy_decision(actor, &pair, &inputs);
        if jump && self.jump_cooldown > 0 {
            jump = false;
        }
        if jump {
            self.jump_cooldown = self.config.policy.jump_cooldown;
        }

        self.apply_safety_overrides(actor, jump)
    }

    /// Grants the per-tick survival and proximity rewards.
    fn reward_tick(&mut self, actor: Position, pair: &ObstaclePair) {
        let reward = self
            .config
            .fitness
            .tick_reward((actor.y - pair.gap_center).abs());
        let score = self.episode_score;
        if let Some(genome) = self.live_genome_mut() {
            genome.reward(reward);
            genome.set_score(score);
        }
    }

    /// The heuristic steers early generations, occasionally
    /// deferring to the network; later ones follow the network.
    fn policy_decision(
        &mut self,
        actor: Position,
        pair: &ObstaclePair,
        inputs: &[f32; SENSOR_COUNT],
    ) -> bool {
        let policy = &self.config.policy;
        if self.population.generation() < policy.heuristic_generations {
            let heuristic =
                actor.y > pair.gap_center + policy.heuristic_margin && self.jump_cooldown == 0;
            if self.rng.chance(policy.exploration_chance) {
                self.network_decision(inputs)
            } else {
                heuristic
            }
        } else {
            self.network_decision(inputs)
        }
    }

    fn network_decision(&mut self, inputs: &[f32; SENSOR_COUNT]) -> bool {
        self.live
            .as_mut()
            .map_or(false, |live| live.network.decide(inputs))
    }

    /// Keeps the actor off the ceiling and the floor.
    fn apply_safety_overrides(&mut self, actor: Position, jump: bool) -> bool {
        let policy = &self.config.policy;
        if actor.y < policy.top_margin {
            false
        } else if actor.y > self.config.viewport.height - policy.bottom_margin {
            self.jump_cooldown = policy.safety_cooldown;
            true
        } else {
            jump
        }
    }

    /// Ends the live genome's episode and moves on.
    ///
    /// A long enough run of zero-score episodes resets the
    /// whole controller. Otherwise, while no score has ever
    /// been reached, a generation is forced every
    /// [`stagnation_check_interval`] genomes; failing that,
    /// the next genome starts.
    ///
    /// [`stagnation_check_interval`]: crate::config::EpisodeConfig::stagnation_check_interval
    pub fn handle_game_over(&mut self) {
        debug!(
            "game over: score {}, fitness {:.2}, generation {}, genome {}/{}",
            self.episode_score,
            self.current_fitness(),
            self.generation(),
            self.cursor,
            self.population.len()
        );

        self.best_score = self.best_score.max(self.episode_score);
        if self.episode_score == 0 {
            self.zero_score_streak += 1;
        } else {
            self.zero_score_streak = 0;
        }

        let episodes = &self.config.episodes;
        if self.zero_score_streak >= episodes.stagnation_reset_threshold {
            warn!(
                "{} consecutive episodes without scoring, resetting",
                self.zero_score_streak
            );
            self.reset();
        } else if self.cursor > 0
            && self.cursor % episodes.stagnation_check_interval == 0
            && self.best_score == 0
        {
            warn!(
                "no score after {} genomes, forcing evolution",
                self.cursor
            );
            self.force_evolve_to_next_generation();
        } else {
            self.start_next_genome();
        }
    }

    /// Evolves the population right away and starts
    /// the first genome of the new generation.
    pub fn force_evolve_to_next_generation(&mut self) {
        info!("forcing evolution to the next generation");
        self.evolve_population();
        self.cursor = 0;
        self.start_next_genome();
    }

    /// Evolves the population. Failures are logged and leave
    /// the population as it was.
    fn evolve_population(&mut self) {
        let from = self.population.generation();
        if let Some(stats) = self.population.fitness_stats() {
            info!("generation {} fitness: {}", from, stats);
        }

        if let Err(e) = self.population.evolve(&mut self.rng) {
            error!("evolution of generation {} failed: {}", from, e);
            return;
        }

        if let Some(champion) = self.population.champion() {
            if champion.score() > self.best_score {
                self.best_score = champion.score();
                info!("new best score {}", self.best_score);
            }
        }
        info!(
            "evolved to generation {} ({} genomes)",
            self.population.generation(),
            self.population.len()
        );
    }

    /// Records the game score reported for the live genome.
    /// Every increase grants the live genome the
    /// [`scoring_bonus`].
    ///
    /// [`scoring_bonus`]: crate::config::FitnessWeights::scoring_bonus
    pub fn update_score(&mut self, score: u32) {
        let bonus = if score > self.episode_score {
            self.config.fitness.scoring_bonus
        } else {
            0.0
        };
        self.episode_score = score;
        if let Some(genome) = self.live_genome_mut() {
            genome.reward(bonus);
            genome.set_score(score);
        }
    }

    /// Replaces the population with a fresh one of the
    /// same size and zeroes every counter. The next tick
    /// starts its first genome.
    pub fn reset(&mut self) {
        info!("resetting controller");
        self.population.reset(&mut self.rng);
        self.live = None;
        self.cursor = 0;
        self.frame_count = 0;
        self.jump_cooldown = 0;
        self.episode_score = 0;
        self.best_score = 0;
        self.zero_score_streak = 0;
        self.genomes_evaluated = 0;
    }

    fn live_genome_mut(&mut self) -> Option<&mut neuroflap::Genome> {
        let index = self.live.as_ref()?.index;
        self.population.genome_mut(index)
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Returns the fitness accumulated by the live genome,
    /// or 0 if no genome is live.
    pub fn current_fitness(&self) -> f32 {
        self.live
            .as_ref()
            .and_then(|live| self.population.genome(live.index))
            .map_or(0.0, |genome| genome.fitness())
    }

    /// Returns the best score reached since creation
    /// or the last reset.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Returns the 1-based position of the live genome
    /// in its generation, or 0 before any has started.
    pub fn genome_index(&self) -> usize {
        self.cursor
    }

    /// Returns the configured population size.
    pub fn population_size(&self) -> usize {
        self.population.size()
    }

    /// Returns the ticks played by the live genome.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Returns the number of episodes started since
    /// creation or the last reset.
    pub fn genomes_evaluated(&self) -> u64 {
        self.genomes_evaluated
    }

    /// Returns the number of consecutive episodes
    /// that ended without scoring.
    pub fn zero_score_streak(&self) -> u32 {
        self.zero_score_streak
    }

    /// Returns the score of the current episode.
    pub fn episode_score(&self) -> u32 {
        self.episode_score
    }

    /// Returns whether a genome is currently playing.
    pub fn is_evaluating(&self) -> bool {
        self.live.is_some()
    }

    /// Returns the controlled population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns a snapshot of every telemetry value.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            generation: self.generation(),
            current_fitness: self.current_fitness(),
            best_score: self.best_score,
            genome_index: self.genome_index(),
            population_size: self.population_size(),
            frame_count: self.frame_count,
            genomes_evaluated: self.genomes_evaluated,
            zero_score_streak: self.zero_score_streak,
        }
    }
}
