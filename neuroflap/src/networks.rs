//! A network is the phenotype of a genome: its enabled
//! genes flattened into index-based connections, with
//! neurons laid out in an order where every neuron comes
//! after all of its inputs.
//!
//! Compiling a genome walks its topology once; evaluating
//! the resulting network is a single linear pass, so
//! callers deciding many times with the same genome should
//! keep the network around.
mod connection;

use crate::genomics::{Genome, NeuronRole};
use crate::{NeuronId, BIAS_NEURON, OUTPUT_NEURON, SENSOR_COUNT};
use connection::Connection;

use ahash::RandomState;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Sensors plus bias, which always occupy the
/// first positions of the evaluation order.
const INPUT_COUNT: usize = SENSOR_COUNT + 1;

/// A feed-forward neural network with the fixed
/// 4-sensor, 1-bias, 1-output interface.
#[derive(Clone, Debug)]
pub struct FeedForwardNetwork {
    neuron_ids: Box<[NeuronId]>,
    input_sums: Box<[f32]>,
    activations: Box<[f32]>,
    connections: Box<[Box<[Connection]>]>,
}

impl FeedForwardNetwork {
    /// Compiles the passed genome into a network.
    ///
    /// Neurons are ordered with Kahn's algorithm over the
    /// enabled genes: sensors and bias first, then hidden
    /// neurons as their inputs become available (lowest id
    /// first among ready neurons), and the output last.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome, History};
    /// use neuroflap::networks::FeedForwardNetwork;
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut rng = seeded_rng(0);
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut rng);
    /// genome.mutate_add_neuron(&mut History::new(), &mut rng).unwrap();
    ///
    /// let network = FeedForwardNetwork::new(&genome);
    /// assert_eq!(network.evaluation_order(), &[0, 1, 2, 3, 4, 6, 5]);
    /// ```
    pub fn new(genome: &Genome) -> FeedForwardNetwork {
        let neuron_ids = Self::topological_order(genome);
        let position: HashMap<NeuronId, usize, RandomState> = neuron_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let mut connections = vec![vec![]; neuron_ids.len()];
        for gene in genome.genes().filter(|g| g.enabled()) {
            match (position.get(&gene.source()), position.get(&gene.target())) {
                (Some(&source), Some(&target)) => {
                    debug_assert!(source < target);
                    connections[source].push(Connection::new(target, gene.weight()));
                }
                _ => debug_assert!(false, "gene {} left out of evaluation order", gene),
            }
        }

        let len = neuron_ids.len();
        FeedForwardNetwork {
            neuron_ids: neuron_ids.into(),
            input_sums: vec![0.0; len].into(),
            activations: vec![0.0; len].into(),
            connections: connections.into_iter().map(Vec::into_boxed_slice).collect(),
        }
    }

    /// Returns the genome's neuron ids in evaluation order,
    /// with the output neuron last.
    fn topological_order(genome: &Genome) -> Vec<NeuronId> {
        let mut in_degree: BTreeMap<NeuronId, usize> =
            genome.neurons().map(|n| (n.id(), 0)).collect();
        for gene in genome.genes().filter(|g| g.enabled()) {
            if let Some(degree) = in_degree.get_mut(&gene.target()) {
                *degree += 1;
            }
        }

        let mut ready: VecDeque<NeuronId> = in_degree
            .iter()
            .filter(|&(&id, &degree)| degree == 0 && id != OUTPUT_NEURON)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            let outgoing = genome.neuron(id).map(|n| n.outgoing()).unwrap_or(&[]);
            for gene in outgoing.iter().map(|&i| genome.gene_at(i)) {
                if !gene.enabled() || gene.target() == OUTPUT_NEURON {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(&gene.target()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(gene.target());
                    }
                }
            }
        }

        // Nothing depends on the output, so holding it back
        // until the end never breaks the ordering.
        order.push(OUTPUT_NEURON);
        order
    }

    /// Evaluates the network on the given sensor values and
    /// returns the logistic-squashed output activation.
    ///
    /// The bias is pinned to 1. A hidden neuron's activation
    /// is the plain sum of its weighted inputs; only the
    /// output is squashed with the logistic function. Every
    /// call starts from a clean state.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::{GeneticConfig, Genome};
    /// use neuroflap::networks::FeedForwardNetwork;
    /// use neuroflap::rng::seeded_rng;
    ///
    /// let mut genome = Genome::new(&GeneticConfig::default(), &mut seeded_rng(0));
    /// for innovation in 0..5 {
    ///     genome.gene_mut(innovation).unwrap().set_weight(0.5);
    /// }
    ///
    /// let mut network = FeedForwardNetwork::new(&genome);
    /// let expected = 1.0 / (1.0 + (-(0.5 + 0.5 * 2.0f32)).exp());
    /// assert!((network.evaluate(&[1.0, 0.0, 1.0, 0.0]) - expected).abs() < 1e-6);
    /// ```
    pub fn evaluate(&mut self, sensors: &[f32; SENSOR_COUNT]) -> f32 {
        self.input_sums.iter_mut().for_each(|s| *s = 0.0);
        self.activations[..SENSOR_COUNT].copy_from_slice(sensors);
        self.activations[BIAS_NEURON] = 1.0;

        let output = self.activations.len() - 1;
        for i in 0..output {
            if i >= INPUT_COUNT {
                self.activations[i] = self.input_sums[i];
            }
            let activation = self.activations[i];
            for connection in self.connections[i].iter() {
                self.input_sums[connection.target] += activation * connection.weight;
            }
        }

        self.activations[output] = sigmoid(self.input_sums[output]);
        self.activations[output]
    }

    /// Evaluates the network and returns the binary
    /// decision: whether the output exceeds 0.5.
    pub fn decide(&mut self, sensors: &[f32; SENSOR_COUNT]) -> bool {
        self.evaluate(sensors) > 0.5
    }

    /// Returns the neuron ids in the order they are evaluated.
    pub fn evaluation_order(&self) -> &[NeuronId] {
        &self.neuron_ids
    }

    /// Returns the number of hidden neurons in the network.
    pub fn hidden_count(&self) -> usize {
        self.neuron_ids
            .iter()
            .filter(|&&id| NeuronRole::of(id) == NeuronRole::Hidden)
            .count()
    }

    /// Returns the number of expressed connections.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|c| c.len()).sum()
    }
}

impl From<&Genome> for FeedForwardNetwork {
    fn from(genome: &Genome) -> FeedForwardNetwork {
        FeedForwardNetwork::new(genome)
    }
}

/// The standard logistic function.
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl fmt::Display for FeedForwardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self as &dyn fmt::Debug).fmt(f)
    }
}
