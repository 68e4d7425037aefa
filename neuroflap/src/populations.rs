//! A Population is a fixed-size collection of genomes
//! sharing a single innovation history, evolved by
//! elitism plus tournament selection, crossover and
//! mutation.
mod config;
mod errors;
pub mod logging;

pub use config::PopulationConfig;
pub use errors::EvolutionError;

use crate::genomics::{GeneticConfig, Genome, History};
use logging::Stats;

use log::{debug, warn};
use rand::prelude::{Rng, SliceRandom};
use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// A population of genomes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    genomes: Vec<Genome>,
    history: History,
    generation: usize,
    champion: Option<Genome>,
    population_config: PopulationConfig,
    genetic_config: GeneticConfig,
}

impl Population {
    /// Creates a new population of minimal genomes
    /// using the passed configurations.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::{Population, PopulationConfig};
    /// use neuroflap::genomics::GeneticConfig;
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let population = Population::new(
    ///     PopulationConfig::default(),
    ///     GeneticConfig::default(),
    ///     &mut seeded_rng(0),
    /// );
    /// assert_eq!(population.len(), 50);
    /// assert_eq!(population.generation(), 0);
    /// assert!(population.champion().is_none());
    /// ```
    pub fn new<R: Rng + ?Sized>(
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
        rng: &mut R,
    ) -> Population {
        Population {
            genomes: Self::fresh_genomes(&population_config, &genetic_config, rng),
            history: History::new(),
            generation: 0,
            champion: None,
            population_config,
            genetic_config,
        }
    }

    fn fresh_genomes<R: Rng + ?Sized>(
        population_config: &PopulationConfig,
        genetic_config: &GeneticConfig,
        rng: &mut R,
    ) -> Vec<Genome> {
        (0..population_config.size.get())
            .map(|_| Genome::new(genetic_config, rng))
            .collect()
    }

    /// Replaces the population with the next generation.
    ///
    /// Genomes are ranked by fitness. The top
    /// [`elite_count`] are carried over unmutated, and the
    /// best is kept as the population [champion]. The
    /// remaining slots are filled with mutated offspring of
    /// two parents, each picked by tournament selection.
    ///
    /// An empty population is reinitialized instead.
    ///
    /// # Errors
    ///
    /// Returns an error if any genome's fitness is not
    /// finite. The population is left untouched.
    ///
    /// [`elite_count`]: PopulationConfig::elite_count
    /// [champion]: Population::champion
    ///
    /// # Examples
    /// ```
    /// use neuroflap::{Population, PopulationConfig};
    /// use neuroflap::genomics::GeneticConfig;
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut rng = seeded_rng(0);
    /// let mut population = Population::new(
    ///     PopulationConfig::default(),
    ///     GeneticConfig::default(),
    ///     &mut rng,
    /// );
    ///
    /// for (i, genome) in population.genomes_mut().enumerate() {
    ///     genome.set_fitness(i as f32);
    /// }
    /// population.evolve(&mut rng).unwrap();
    ///
    /// assert_eq!(population.generation(), 1);
    /// assert_eq!(population.champion().unwrap().fitness(), 49.0);
    /// ```
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EvolutionError> {
        if self.genomes.is_empty() {
            warn!("evolving an empty population, reinitializing");
            self.genomes = Self::fresh_genomes(&self.population_config, &self.genetic_config, rng);
            return Ok(());
        }

        if let Some((i, genome)) = self
            .genomes
            .iter()
            .enumerate()
            .find(|(_, g)| !g.fitness().is_finite())
        {
            return Err(EvolutionError::InvalidFitness(i, genome.fitness()));
        }

        let mut ranked: Vec<&Genome> = self.genomes.iter().collect();
        ranked.sort_by(|a, b| by_decreasing_fitness(a, b));

        let size = self.population_config.size.get();
        let tournament_size = self.population_config.tournament_size.get();
        let mut next_generation: Vec<Genome> = ranked
            .iter()
            .take(self.population_config.elite_count())
            .map(|&g| g.clone())
            .collect();
        let champion = next_generation[0].clone();

        while next_generation.len() < size {
            let parent1 = tournament(&ranked, tournament_size, rng);
            let parent2 = tournament(&ranked, tournament_size, rng);
            let mut child = Genome::crossover(parent1, parent2, rng);
            child.mutate(&mut self.history, &self.genetic_config, rng);
            next_generation.push(child);
        }

        debug!(
            "generation {} evolved, champion fitness {:.2}, score {}",
            self.generation,
            champion.fitness(),
            champion.score()
        );

        self.genomes = next_generation;
        self.champion = Some(champion);
        self.generation += 1;
        Ok(())
    }

    /// Resets the population to an initial randomized state,
    /// with a fresh innovation history and no champion.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::{Population, PopulationConfig};
    /// use neuroflap::genomics::GeneticConfig;
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut rng = seeded_rng(0);
    /// let mut population = Population::new(
    ///     PopulationConfig::default(),
    ///     GeneticConfig::default(),
    ///     &mut rng,
    /// );
    /// population.evolve(&mut rng).unwrap();
    ///
    /// population.reset(&mut rng);
    /// assert_eq!(population.generation(), 0);
    /// assert!(population.champion().is_none());
    /// ```
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.genomes = Self::fresh_genomes(&self.population_config, &self.genetic_config, rng);
        self.history = History::new();
        self.generation = 0;
        self.champion = None;
    }

    /// Returns an iterator over the population's genomes.
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    /// Returns a mutable iterator over the population's
    /// genomes, for fitness assignment.
    pub fn genomes_mut(&mut self) -> impl Iterator<Item = &mut Genome> {
        self.genomes.iter_mut()
    }

    /// Returns the genome at position `index`.
    pub fn genome(&self, index: usize) -> Option<&Genome> {
        self.genomes.get(index)
    }

    /// Returns the genome at position `index`, mutably.
    pub fn genome_mut(&mut self, index: usize) -> Option<&mut Genome> {
        self.genomes.get_mut(index)
    }

    /// Returns the number of genomes currently held.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Returns whether the population holds no genomes.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns the configured population size.
    pub fn size(&self) -> usize {
        self.population_config.size.get()
    }

    /// Returns the number of evolutions since
    /// creation or the last reset.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns a copy of the best genome of the
    /// previous generation, as ranked by the last
    /// call to [`evolve`].
    ///
    /// [`evolve`]: Population::evolve
    pub fn champion(&self) -> Option<&Genome> {
        self.champion.as_ref()
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the population's configuration.
    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    /// Returns the configuration genomes are mutated with.
    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }

    /// Returns fitness statistics over the current genomes,
    /// or `None` if the population is empty.
    pub fn fitness_stats(&self) -> Option<Stats> {
        Stats::from(self.genomes.iter().map(Genome::fitness))
    }
}

fn by_decreasing_fitness(a: &Genome, b: &Genome) -> Ordering {
    b.fitness()
        .partial_cmp(&a.fitness())
        .unwrap_or(Ordering::Equal)
}

/// Samples `rounds` genomes uniformly, with replacement,
/// and returns the fittest. Ties go to the earliest sample.
fn tournament<'a, R: Rng + ?Sized>(
    candidates: &[&'a Genome],
    rounds: usize,
    rng: &mut R,
) -> &'a Genome {
    let mut winner = candidates[rng.gen_range(0..candidates.len())];
    for _ in 1..rounds {
        if let Some(&contender) = candidates.choose(rng) {
            if contender.fitness() > winner.fitness() {
                winner = contender;
            }
        }
    }
    winner
}
