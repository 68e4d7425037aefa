//! Genomes are the focus of evolution.
//! They are a collection of genes and neurons that can be
//! compiled into a phenotype (a feed-forward network).
//! Genomes can be progressively mutated, thus adding
//! complexity and functionality.

mod config;
mod errors;
mod genes;
mod history;
mod neurons;

pub use config::GeneticConfig;
pub use errors::GenomeError;
pub use genes::Gene;
pub use history::{History, NeuronSplit};
pub use neurons::{Neuron, NeuronRole};

use crate::networks::FeedForwardNetwork;
use crate::rng::Chance;
use crate::{Innovation, NeuronId, BIAS_NEURON, OUTPUT_NEURON, SENSOR_COUNT};

use ahash::RandomState;
use rand::prelude::{Rng, SliceRandom};
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A mutable collection of genes and neurons.
///
/// Genes are stored in creation order and never removed;
/// neurons refer to their outgoing genes by position in
/// that list. Supports Serde for convenient genome saving
/// and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    neurons: BTreeMap<NeuronId, Neuron>,
    genes: Vec<Gene>,
    pairings: HashSet<(NeuronId, NeuronId), RandomState>,
    pub(crate) fitness: f32,
    pub(crate) score: u32,
}

impl Genome {
    /// Creates a genome with the minimal topology: every sensor
    /// and the bias connected straight to the output, with
    /// uniformly random weights in ±`config.weight_bound`.
    ///
    /// The initial genes are given the innovation number of
    /// their source neuron, `0..=4`.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome, NeuronRole};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let config = GeneticConfig::default();
    /// let genome = Genome::new(&config, &mut seeded_rng(1));
    ///
    /// assert_eq!(genome.neurons().count(), 6);
    /// assert_eq!(genome.neurons().filter(|n| n.role() == NeuronRole::Sensor).count(), 4);
    /// assert_eq!(genome.genes().count(), 5);
    /// assert!(genome.genes().all(|g| g.enabled() && g.weight().abs() <= 1.0));
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> Genome {
        let mut genome = Genome::empty();
        for source in 0..=BIAS_NEURON {
            genome.add_gene_unchecked(
                source,
                source,
                OUTPUT_NEURON,
                Gene::random_weight(config, rng),
            );
        }
        genome
    }

    /// A genome holding the sensor, bias and output
    /// neurons, and no genes.
    fn empty() -> Genome {
        Genome {
            neurons: (0..=OUTPUT_NEURON).map(|id| (id, Neuron::new(id))).collect(),
            genes: Vec::with_capacity(BIAS_NEURON + 1),
            pairings: HashSet::default(),
            fitness: 0.0,
            score: 0,
        }
    }

    /// Adds a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene with the same innovation number
    /// or endpoints already exists, if either endpoint is absent,
    /// if the gene would start at the output or end at a sensor
    /// or bias neuron, or if it would close a cycle.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(1));
    /// genome.add_neuron(6).unwrap();
    ///
    /// let gene = genome.add_gene(42, 2, 6, 0.5).unwrap().clone();
    /// assert_eq!(gene.endpoints(), (2, 6));
    ///
    /// // Genes can't end at sensors, nor start at the output.
    /// assert!(genome.add_gene(43, 6, 1, 1.0).is_err());
    /// assert!(genome.add_gene(44, 5, 6, 1.0).is_err());
    /// ```
    pub fn add_gene(
        &mut self,
        gene_id: Innovation,
        source: NeuronId,
        target: NeuronId,
        weight: f32,
    ) -> Result<&mut Gene, GenomeError> {
        self.check_gene_validity(gene_id, source, target)?;
        Ok(self.add_gene_unchecked(gene_id, source, target, weight))
    }

    /// Adds a new gene to the genome, assuming it is
    /// not a duplicate or invalid gene for the genome.
    fn add_gene_unchecked(
        &mut self,
        gene_id: Innovation,
        source: NeuronId,
        target: NeuronId,
        weight: f32,
    ) -> &mut Gene {
        self.push_gene(Gene::new(gene_id, source, target, weight))
    }

    fn push_gene(&mut self, gene: Gene) -> &mut Gene {
        let index = self.genes.len();
        if let Some(source) = self.neurons.get_mut(&gene.source()) {
            source.add_outgoing(index);
        }
        self.pairings.insert(gene.endpoints());
        self.genes.push(gene);
        &mut self.genes[index]
    }

    fn check_gene_validity(
        &self,
        gene_id: Innovation,
        source: NeuronId,
        target: NeuronId,
    ) -> Result<(), GenomeError> {
        use GenomeError::*;
        if self.gene(gene_id).is_some() {
            Err(DuplicateGene(gene_id, source, target))
        } else if !(self.neurons.contains_key(&source) && self.neurons.contains_key(&target)) {
            Err(NonexistentEndpoints(source, target))
        } else if !NeuronRole::of(source).can_be_source() {
            Err(InvalidSource(source))
        } else if !NeuronRole::of(target).can_be_target() {
            Err(InvalidTarget(target))
        } else if self.pairings.contains(&(source, target)) {
            Err(DuplicateEndpoints(gene_id, source, target))
        } else if self.would_create_cycle(source, target) {
            Err(CreatesCycle(source, target))
        } else {
            Ok(())
        }
    }

    /// Whether a gene `source -> target` would close a cycle.
    ///
    /// Disabled genes are taken into account too, so that
    /// re-enabling a gene can never break the feed-forward
    /// property.
    fn would_create_cycle(&self, source: NeuronId, target: NeuronId) -> bool {
        let mut visited: HashSet<NeuronId, RandomState> = HashSet::default();
        let mut stack = vec![target];

        while let Some(current) = stack.pop() {
            if current == source {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(neuron) = self.neurons.get(&current) {
                stack.extend(neuron.outgoing().iter().map(|&i| self.genes[i].target()));
            }
        }

        false
    }

    /// Adds a new hidden neuron to the genome.
    /// Returns a reference to the newly created neuron.
    ///
    /// # Errors
    ///
    /// Returns an error if a neuron with the same id already
    /// exists, or if `neuron_id` belongs to a sensor, the bias
    /// or the output.
    pub fn add_neuron(&mut self, neuron_id: NeuronId) -> Result<&mut Neuron, GenomeError> {
        if self.neurons.contains_key(&neuron_id) {
            Err(GenomeError::DuplicateNeuron(neuron_id))
        } else if NeuronRole::of(neuron_id) != NeuronRole::Hidden {
            Err(GenomeError::ReservedNeuron(neuron_id))
        } else {
            Ok(self.add_neuron_unchecked(neuron_id))
        }
    }

    fn add_neuron_unchecked(&mut self, neuron_id: NeuronId) -> &mut Neuron {
        self.neurons
            .entry(neuron_id)
            .or_insert_with(|| Neuron::new(neuron_id))
    }

    /// Runs the three structural and parametric mutations
    /// as independent Bernoulli trials, with the chances set
    /// in `config`. Failed structural mutations are skipped.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        if rng.chance(config.weight_mutation_chance) {
            self.mutate_weights(config, rng);
        }
        if rng.chance(config.connection_addition_chance) {
            let _ = self.mutate_add_connection(history, config, rng);
        }
        if rng.chance(config.neuron_addition_chance) {
            let _ = self.mutate_add_neuron(history, rng);
        }
    }

    /// Induces a _weight mutation_ in every gene: each is
    /// nudged with chance `weight_nudge_chance` (see
    /// [`Gene::nudge_weight`]), or else reset to a random value.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = seeded_rng(9);
    /// let mut genome = Genome::new(&config, &mut rng);
    ///
    /// for _ in 0..100 {
    ///     genome.mutate_weights(&config, &mut rng);
    /// }
    /// assert!(genome.genes().all(|g| (-1.0..=1.0).contains(&g.weight())));
    /// ```
    pub fn mutate_weights<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        for gene in &mut self.genes {
            if rng.chance(config.weight_nudge_chance) {
                gene.nudge_weight(config, rng);
            } else {
                gene.randomize_weight(config, rng);
            }
        }
    }

    /// Induces a _connection mutation_ in the genome: a new gene
    /// between a uniformly chosen pair of unconnected neurons
    /// that keeps the genome feed-forward. If successful,
    /// returns the newly added gene.
    ///
    /// # Errors
    ///
    /// Returns an error if no viable pair of neurons exists.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome, History};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = seeded_rng(3);
    /// let mut history = History::new();
    /// let mut genome = Genome::new(&config, &mut rng);
    ///
    /// // The minimal genome is fully connected.
    /// assert!(genome.mutate_add_connection(&mut history, &config, &mut rng).is_err());
    ///
    /// // A hidden neuron opens up new pairs.
    /// genome.mutate_add_neuron(&mut history, &mut rng).unwrap();
    /// assert!(genome.mutate_add_connection(&mut history, &config, &mut rng).is_ok());
    /// ```
    pub fn mutate_add_connection<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<&Gene, GenomeError> {
        let (source, target) = *self
            .candidate_connections()
            .choose(rng)
            .ok_or(GenomeError::FullyConnected)?;

        let gene_id = history.add_gene_innovation(source, target);
        let weight = Gene::random_weight(config, rng);
        Ok(self.add_gene_unchecked(gene_id, source, target, weight))
    }

    /// Returns every `(source, target)` pair a new gene
    /// could connect, in ascending order.
    fn candidate_connections(&self) -> Vec<(NeuronId, NeuronId)> {
        let sources = self.neurons.values().filter(|n| n.role().can_be_source());
        let targets: Vec<NeuronId> = self
            .neurons
            .values()
            .filter(|n| n.role().can_be_target())
            .map(Neuron::id)
            .collect();

        sources
            .flat_map(|s| targets.iter().map(move |&t| (s.id(), t)))
            .filter(|&(s, t)| {
                s != t && !self.pairings.contains(&(s, t)) && !self.would_create_cycle(s, t)
            })
            .collect()
    }

    /// Induces a _neuron mutation_ in the genome: a uniformly
    /// chosen enabled gene is disabled and replaced by a new
    /// hidden neuron and two genes. The incoming gene has weight
    /// 1, the outgoing gene inherits the split gene's weight.
    ///
    /// If successful, returns the triplet
    /// (_input gene_, _new neuron_, _output gene_).
    ///
    /// # Errors
    ///
    /// Returns an error if the genome has no enabled genes.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome, History, NeuronRole};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut rng = seeded_rng(11);
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut rng);
    ///
    /// let (input_gene, neuron, output_gene) = genome
    ///     .mutate_add_neuron(&mut History::new(), &mut rng)
    ///     .map(|(i, n, o)| (i.clone(), n.clone(), o.clone()))
    ///     .unwrap();
    ///
    /// assert_eq!(neuron.role(), NeuronRole::Hidden);
    /// assert_eq!(input_gene.target(), neuron.id());
    /// assert_eq!(input_gene.weight(), 1.0);
    /// assert_eq!(output_gene.source(), neuron.id());
    ///
    /// assert_eq!(genome.genes().count(), 5 + 2);
    /// assert_eq!(genome.genes().filter(|g| !g.enabled()).count(), 1);
    /// ```
    pub fn mutate_add_neuron<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        rng: &mut R,
    ) -> Result<(&Gene, &Neuron, &Gene), GenomeError> {
        let enabled: Vec<usize> = (0..self.genes.len())
            .filter(|&i| self.genes[i].enabled())
            .collect();
        let split_index = *enabled.choose(rng).ok_or(GenomeError::NoEnabledGenes)?;

        let split_gene = &self.genes[split_index];
        let (split_id, endpoints, weight) =
            (split_gene.innovation(), split_gene.endpoints(), split_gene.weight());

        // A previously registered split may introduce a neuron this
        // genome already holds; if so, fresh numbers are needed.
        let (_, registered_neuron, _) = history.next_neuron_innovation(split_id, false);
        let duplicate = self.neurons.contains_key(&registered_neuron);
        let mut split = history.add_neuron_innovation(split_id, endpoints, duplicate);
        // Neurons and genes added by hand may already use the
        // numbers handed out; skip past them.
        while self.uses_any(split) {
            split = history.add_neuron_innovation(split_id, endpoints, true);
        }
        let (input_gene, new_neuron, output_gene) = split;

        self.genes[split_index].set_enabled(false);
        self.add_neuron_unchecked(new_neuron);
        self.add_gene_unchecked(input_gene, endpoints.0, new_neuron, 1.0);
        self.add_gene_unchecked(output_gene, new_neuron, endpoints.1, weight);

        let len = self.genes.len();
        Ok((
            &self.genes[len - 2],
            &self.neurons[&new_neuron],
            &self.genes[len - 1],
        ))
    }

    /// Whether the genome already holds the neuron or
    /// either gene of `split`.
    fn uses_any(&self, (input_gene, neuron, output_gene): NeuronSplit) -> bool {
        self.neurons.contains_key(&neuron)
            || self.gene(input_gene).is_some()
            || self.gene(output_gene).is_some()
    }

    /// Combines two genomes and returns their _child_ genome.
    ///
    /// The parent with the higher fitness is dominant (ties go
    /// to `first`). The child inherits the dominant parent's
    /// topology; genes present and enabled in both parents take
    /// their allele from either one with equal chance, while
    /// genes unique to the dominant parent are always inherited.
    /// The child starts with zero fitness and score.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut rng = seeded_rng(5);
    /// let config = GeneticConfig::default();
    /// let parent1 = Genome::new(&config, &mut rng);
    /// let parent2 = Genome::new(&config, &mut rng);
    ///
    /// let child = Genome::crossover(&parent1, &parent2, &mut rng);
    ///
    /// assert_eq!(child.genes().count(), 5);
    /// assert!(child.genes().all(|g| {
    ///     let w = g.weight();
    ///     w == parent1.gene(g.innovation()).unwrap().weight()
    ///         || w == parent2.gene(g.innovation()).unwrap().weight()
    /// }));
    /// ```
    pub fn crossover<R: Rng + ?Sized>(first: &Genome, second: &Genome, rng: &mut R) -> Genome {
        let (dominant, other) = if second.fitness > first.fitness {
            (second, first)
        } else {
            (first, second)
        };

        let alleles: HashMap<Innovation, &Gene, RandomState> = other
            .genes
            .iter()
            .map(|g| (g.innovation(), g))
            .collect();

        let mut child = Genome {
            neurons: dominant
                .neurons
                .keys()
                .map(|&id| (id, Neuron::new(id)))
                .collect(),
            genes: Vec::with_capacity(dominant.genes.len()),
            pairings: HashSet::default(),
            fitness: 0.0,
            score: 0,
        };

        for gene in &dominant.genes {
            let inherited = match alleles.get(&gene.innovation()) {
                Some(allele)
                    if allele.endpoints() == gene.endpoints()
                        && gene.enabled()
                        && allele.enabled()
                        && rng.gen::<bool>() =>
                {
                    allele
                }
                _ => gene,
            };
            child.add_neuron_unchecked(inherited.source());
            child.add_neuron_unchecked(inherited.target());
            child.push_gene(inherited.clone());
        }

        child
    }

    /// Evaluates the genome on the given sensor values and
    /// returns the jump decision: whether the squashed output
    /// activation exceeds 0.5.
    ///
    /// This compiles a fresh [`FeedForwardNetwork`]; callers
    /// evaluating the same genome repeatedly should keep the
    /// network instead.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(1));
    /// for innovation in 0..5 {
    ///     genome.gene_mut(innovation).unwrap().set_weight(1.0);
    /// }
    ///
    /// // Only the bias contributes: sigmoid(1) ≈ 0.731.
    /// assert!(genome.activate(&[0.0, 0.0, 0.0, 0.0]));
    /// // 1 + 4 × (-1) = -3: sigmoid(-3) ≈ 0.047.
    /// assert!(!genome.activate(&[-1.0, -1.0, -1.0, -1.0]));
    /// ```
    pub fn activate(&self, sensors: &[f32; SENSOR_COUNT]) -> bool {
        FeedForwardNetwork::from(self).decide(sensors)
    }

    /// Checks every structural invariant of the genome:
    /// endpoints exist and respect neuron roles, innovation
    /// numbers and endpoint pairs are unique, adjacency lists
    /// match the genes, and the graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), GenomeError> {
        let mut ids: HashSet<Innovation, RandomState> = HashSet::default();
        let mut pairs: HashSet<(NeuronId, NeuronId), RandomState> = HashSet::default();

        for (index, gene) in self.genes.iter().enumerate() {
            let (source, target) = gene.endpoints();
            if !ids.insert(gene.innovation()) {
                return Err(GenomeError::DuplicateGene(gene.innovation(), source, target));
            }
            if !pairs.insert((source, target)) {
                return Err(GenomeError::DuplicateEndpoints(gene.innovation(), source, target));
            }
            match (self.neurons.get(&source), self.neurons.get(&target)) {
                (Some(s), Some(t)) => {
                    if !s.role().can_be_source() {
                        return Err(GenomeError::InvalidSource(source));
                    }
                    if !t.role().can_be_target() {
                        return Err(GenomeError::InvalidTarget(target));
                    }
                    if !s.outgoing().contains(&index) {
                        return Err(GenomeError::NonexistentEndpoints(source, target));
                    }
                }
                _ => return Err(GenomeError::NonexistentEndpoints(source, target)),
            }
        }

        for gene in &self.genes {
            let (source, target) = gene.endpoints();
            if self.reaches(target, source) {
                return Err(GenomeError::CreatesCycle(source, target));
            }
        }

        Ok(())
    }

    /// Whether a directed path leads from `from` to `to`.
    fn reaches(&self, from: NeuronId, to: NeuronId) -> bool {
        self.would_create_cycle(to, from)
    }

    /// Returns an iterator over the genome's genes,
    /// in creation order.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    /// Returns an iterator over the genome's neurons,
    /// in ascending id order.
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.neurons.values()
    }

    /// Returns the gene with the given innovation number.
    pub fn gene(&self, innovation: Innovation) -> Option<&Gene> {
        self.genes.iter().find(|g| g.innovation() == innovation)
    }

    /// Returns the gene with the given innovation number, mutably.
    /// Only the weight and expression of a gene can be changed.
    pub fn gene_mut(&mut self, innovation: Innovation) -> Option<&mut Gene> {
        self.genes.iter_mut().find(|g| g.innovation() == innovation)
    }

    /// Returns the gene at position `index` in creation order.
    pub(crate) fn gene_at(&self, index: usize) -> &Gene {
        &self.genes[index]
    }

    /// Returns the neuron with the given id.
    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(&id)
    }

    /// Returns the number of hidden neurons.
    pub fn hidden_count(&self) -> usize {
        self.neurons
            .values()
            .filter(|n| n.role() == NeuronRole::Hidden)
            .count()
    }

    /// Sets the genome's fitness to the value passed.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Adds `reward` to the genome's fitness.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(1));
    /// genome.reward(1.0);
    /// genome.reward(0.5);
    /// assert_eq!(genome.fitness(), 1.5);
    /// ```
    pub fn reward(&mut self, reward: f32) {
        self.fitness += reward;
    }

    /// Returns the genome's accumulated fitness.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Sets the raw game score the genome reached.
    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Returns the raw game score the genome reached.
    pub fn score(&self) -> u32 {
        self.score
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genes: Vec<String> = self.genes.iter().map(Gene::to_string).collect();
        let neurons: Vec<NeuronId> = self.neurons.keys().copied().collect();
        f.debug_struct("Genome")
            .field("Genes", &genes)
            .field("Neurons", &neurons)
            .field("Fitness", &self.fitness)
            .field("Score", &self.score)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use crate::FIRST_HIDDEN_NEURON;

    fn unit_genome() -> Genome {
        let mut genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(0));
        for innovation in 0..=BIAS_NEURON {
            genome.gene_mut(innovation).unwrap().set_weight(1.0);
        }
        genome
    }

    fn always_mutating() -> GeneticConfig {
        GeneticConfig {
            weight_mutation_chance: 1.0,
            connection_addition_chance: 1.0,
            neuron_addition_chance: 1.0,
            ..GeneticConfig::default()
        }
    }

    #[test]
    fn new_minimal_topology() {
        let genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(7));
        assert_eq!(
            genome.neurons().map(Neuron::id).collect::<Vec<_>>(),
            (0..=OUTPUT_NEURON).collect::<Vec<_>>()
        );
        assert_eq!(genome.genes().count(), 5);
        for (i, gene) in genome.genes().enumerate() {
            assert_eq!(gene.innovation(), i);
            assert_eq!(gene.endpoints(), (i, OUTPUT_NEURON));
            assert!(gene.enabled());
        }
        assert_eq!(genome.fitness(), 0.0);
        assert_eq!(genome.score(), 0);
        genome.validate().unwrap();
    }

    #[test]
    fn activate_unit_weights() {
        let genome = unit_genome();
        assert!(genome.activate(&[0.0; 4]));
        assert!(!genome.activate(&[-1.0; 4]));
    }

    #[test]
    fn activate_is_pure() {
        let mut rng = seeded_rng(21);
        let config = always_mutating();
        let mut history = History::new();
        let mut genome = Genome::new(&config, &mut rng);
        for _ in 0..20 {
            genome.mutate(&mut history, &config, &mut rng);
        }
        genome.set_fitness(12.5);
        let before = genome.clone();
        let sensors = [0.3, -0.2, 0.7, 0.1];
        let first = genome.activate(&sensors);
        for _ in 0..10 {
            assert_eq!(genome.activate(&sensors), first);
        }
        assert_eq!(genome, before);
    }

    #[test]
    fn add_gene_rejections() {
        let mut genome = unit_genome();
        genome.add_neuron(6).unwrap();
        genome.add_neuron(7).unwrap();

        assert_eq!(
            genome.add_gene(0, 1, 6, 1.0).unwrap_err(),
            GenomeError::DuplicateGene(0, 1, 6)
        );
        assert_eq!(
            genome.add_gene(10, 1, 9, 1.0).unwrap_err(),
            GenomeError::NonexistentEndpoints(1, 9)
        );
        assert_eq!(
            genome.add_gene(10, OUTPUT_NEURON, 6, 1.0).unwrap_err(),
            GenomeError::InvalidSource(OUTPUT_NEURON)
        );
        assert_eq!(
            genome.add_gene(10, 6, BIAS_NEURON, 1.0).unwrap_err(),
            GenomeError::InvalidTarget(BIAS_NEURON)
        );
        assert_eq!(
            genome.add_gene(10, 2, OUTPUT_NEURON, 1.0).unwrap_err(),
            GenomeError::DuplicateEndpoints(10, 2, OUTPUT_NEURON)
        );

        genome.add_gene(10, 6, 7, 1.0).unwrap();
        assert_eq!(
            genome.add_gene(11, 7, 6, 1.0).unwrap_err(),
            GenomeError::CreatesCycle(7, 6)
        );
        assert_eq!(
            genome.add_gene(11, 6, 6, 1.0).unwrap_err(),
            GenomeError::CreatesCycle(6, 6)
        );
        genome.validate().unwrap();
    }

    #[test]
    fn add_neuron_rejections() {
        let mut genome = unit_genome();
        assert_eq!(
            genome.add_neuron(OUTPUT_NEURON).unwrap_err(),
            GenomeError::DuplicateNeuron(OUTPUT_NEURON)
        );
        genome.add_neuron(FIRST_HIDDEN_NEURON).unwrap();
        assert_eq!(
            genome.add_neuron(FIRST_HIDDEN_NEURON).unwrap_err(),
            GenomeError::DuplicateNeuron(FIRST_HIDDEN_NEURON)
        );
    }

    #[test]
    fn hidden_chain_is_evaluated_in_dependency_order() {
        // 0 -> 7 -> 6 -> out: a chain whose ids run against the
        // dependency order.
        let mut genome = Genome::empty();
        genome.add_neuron(6).unwrap();
        genome.add_neuron(7).unwrap();
        genome.add_gene(0, 0, 7, 1.0).unwrap();
        genome.add_gene(1, 7, 6, 1.0).unwrap();
        genome.add_gene(2, 6, OUTPUT_NEURON, -10.0).unwrap();

        assert!(!genome.activate(&[5.0, 0.0, 0.0, 0.0]));

        genome.gene_mut(2).unwrap().set_weight(1.0);
        genome.add_gene(3, BIAS_NEURON, OUTPUT_NEURON, -4.0).unwrap();
        // 5 - 4 = 1, whereas evaluating 6 before 7 gives 0 - 4.
        assert!(genome.activate(&[5.0, 0.0, 0.0, 0.0]));
        assert!(!genome.activate(&[3.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn add_neuron_shares_innovations_across_genomes() {
        let mut rng = seeded_rng(4);
        let config = GeneticConfig::default();
        let mut history = History::new();

        let mut g1 = Genome::new(&config, &mut rng);
        let mut g2 = g1.clone();
        // Disable every gene but #2 so both split the same one.
        for genome in [&mut g1, &mut g2] {
            for innovation in [0, 1, 3, 4] {
                genome.gene_mut(innovation).unwrap().set_enabled(false);
            }
        }

        let first: Vec<Innovation> = {
            let (i, n, o) = g1.mutate_add_neuron(&mut history, &mut rng).unwrap();
            vec![i.innovation(), n.id(), o.innovation()]
        };
        let second: Vec<Innovation> = {
            let (i, n, o) = g2.mutate_add_neuron(&mut history, &mut rng).unwrap();
            vec![i.innovation(), n.id(), o.innovation()]
        };
        assert_eq!(first, second);
        assert_eq!(first, vec![5, FIRST_HIDDEN_NEURON, 6]);
    }

    #[test]
    fn add_neuron_avoids_duplicate_neurons() {
        let mut rng = seeded_rng(4);
        let config = GeneticConfig::default();
        let mut history = History::new();

        let mut genome = Genome::new(&config, &mut rng);
        for innovation in [0, 1, 3, 4] {
            genome.gene_mut(innovation).unwrap().set_enabled(false);
        }
        genome.mutate_add_neuron(&mut history, &mut rng).unwrap();
        // Re-enable the split gene and disable the others,
        // forcing the same split again.
        genome.gene_mut(2).unwrap().set_enabled(true);
        genome.gene_mut(5).unwrap().set_enabled(false);
        genome.gene_mut(6).unwrap().set_enabled(false);

        let (_, neuron, _) = genome.mutate_add_neuron(&mut history, &mut rng).unwrap();
        assert_eq!(neuron.id(), FIRST_HIDDEN_NEURON + 1);
        assert_eq!(genome.hidden_count(), 2);
        genome.validate().unwrap();
    }

    #[test]
    fn add_neuron_skips_numbers_taken_by_hand() {
        let mut rng = seeded_rng(6);
        let mut genome = Genome::new(&GeneticConfig::default(), &mut rng);
        genome.add_neuron(FIRST_HIDDEN_NEURON).unwrap();
        genome.add_gene(5, 0, FIRST_HIDDEN_NEURON, 0.5).unwrap();

        let mut history = History::new();
        let (input_gene, neuron, output_gene) = genome
            .mutate_add_neuron(&mut history, &mut rng)
            .map(|(i, n, o)| (i.innovation(), n.id(), o.innovation()))
            .unwrap();

        assert_eq!((input_gene, neuron, output_gene), (7, 7, 8));
        assert_eq!(genome.hidden_count(), 2);
        assert_eq!(genome.genes().count(), 6 + 2);
        genome.validate().unwrap();
    }

    #[test]
    fn add_neuron_on_disabled_genome_fails() {
        let mut rng = seeded_rng(4);
        let mut genome = unit_genome();
        for innovation in 0..=BIAS_NEURON {
            genome.gene_mut(innovation).unwrap().set_enabled(false);
        }
        assert_eq!(
            genome
                .mutate_add_neuron(&mut History::new(), &mut rng)
                .unwrap_err(),
            GenomeError::NoEnabledGenes
        );
    }

    #[test]
    fn mutations_preserve_topology() {
        let config = always_mutating();
        for seed in 0..20 {
            let mut rng = seeded_rng(seed);
            let mut history = History::new();
            let mut genome = Genome::new(&config, &mut rng);
            for _ in 0..50 {
                genome.mutate(&mut history, &config, &mut rng);
                genome.validate().unwrap();
            }
            for gene in genome.genes() {
                assert!(genome.neuron(gene.source()).is_some());
                assert!(genome.neuron(gene.target()).is_some());
                assert_ne!(gene.source(), OUTPUT_NEURON);
                assert!(gene.target() > BIAS_NEURON);
                assert!((-1.0..=1.0).contains(&gene.weight()));
            }
        }
    }

    #[test]
    fn crossover_of_identical_structure() {
        let mut rng = seeded_rng(8);
        let config = GeneticConfig::default();
        let mut history = History::new();
        let mut parent = Genome::new(&config, &mut rng);
        parent.mutate_add_neuron(&mut history, &mut rng).unwrap();
        let mut other = parent.clone();
        other.mutate_weights(&config, &mut rng);

        let child = Genome::crossover(&parent, &other, &mut rng);
        assert_eq!(child.neurons().count(), parent.neurons().count());
        assert_eq!(child.genes().count(), parent.genes().count());
        child.validate().unwrap();
    }

    #[test]
    fn crossover_keeps_dominant_structure() {
        let mut rng = seeded_rng(15);
        let config = GeneticConfig::default();
        let mut history = History::new();
        let weak = Genome::new(&config, &mut rng);
        let mut strong = weak.clone();
        strong.mutate_add_neuron(&mut history, &mut rng).unwrap();
        strong.mutate_add_connection(&mut history, &config, &mut rng).unwrap();
        strong.set_fitness(10.0);

        for _ in 0..10 {
            let child = Genome::crossover(&weak, &strong, &mut rng);
            assert_eq!(child.genes().count(), strong.genes().count());
            assert_eq!(child.hidden_count(), 1);
            assert_eq!(child.fitness(), 0.0);
            for (c, s) in child.genes().zip(strong.genes()) {
                assert_eq!(c.innovation(), s.innovation());
                assert_eq!(c.enabled(), s.enabled());
            }
            child.validate().unwrap();
        }
    }

    #[test]
    fn crossover_mixes_common_alleles() {
        let mut rng = seeded_rng(2);
        let config = GeneticConfig::default();
        let mut a = Genome::new(&config, &mut rng);
        let mut b = a.clone();
        for innovation in 0..=BIAS_NEURON {
            a.gene_mut(innovation).unwrap().set_weight(1.0);
            b.gene_mut(innovation).unwrap().set_weight(-1.0);
        }

        let mut from_a = 0;
        let mut from_b = 0;
        for _ in 0..50 {
            let child = Genome::crossover(&a, &b, &mut rng);
            for gene in child.genes() {
                if gene.weight() == 1.0 {
                    from_a += 1;
                } else {
                    from_b += 1;
                }
            }
        }
        assert!(from_a > 50 && from_b > 50);
    }

    #[test]
    fn clone_is_independent() {
        let original = unit_genome();
        let mut copy = original.clone();
        copy.gene_mut(0).unwrap().set_weight(-0.5);
        copy.reward(3.0);
        assert_eq!(original.gene(0).unwrap().weight(), 1.0);
        assert_eq!(original.fitness(), 0.0);
    }

    #[test]
    fn serde_round_trip() {
        let mut rng = seeded_rng(31);
        let mut genome = Genome::new(&GeneticConfig::default(), &mut rng);
        genome.mutate_add_neuron(&mut History::new(), &mut rng).unwrap();
        genome.set_score(4);

        let json = serde_json::to_string(&genome).unwrap();
        let restored: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, genome);
        restored.validate().unwrap();
    }
}
