use crate::{Innovation, NeuronId, BIAS_NEURON, FIRST_HIDDEN_NEURON, OUTPUT_NEURON};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::{Entry, HashMap};

/// Innovation numbers assigned to a neuron addition mutation,
/// in the order `(input gene, new neuron, output gene)`.
pub type NeuronSplit = (Innovation, NeuronId, Innovation);

/// A `History` keeps track of gene and neuron innovations in a
/// population, so that identical structural mutations in
/// different lineages are assigned the same innovation numbers.
///
/// For gene innovations the source and target neurons identify
/// identical mutations. For neuron innovations the split gene
/// does, and the numbers of the input gene, new neuron and
/// output gene are recorded, in that order.
///
/// A single `History` is shared, by mutable reference, by
/// every genome of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    next_gene_innovation: Innovation,
    next_neuron_id: NeuronId,
    #[serde(with = "endpoint_entries")]
    gene_innovations: HashMap<(NeuronId, NeuronId), Innovation, RandomState>,
    neuron_innovations: HashMap<Innovation, NeuronSplit, RandomState>,
}

impl History {
    /// Creates a new History.
    ///
    /// The genes of the minimal topology (every sensor and the
    /// bias feeding the output) are pre-registered with innovation
    /// numbers `0..=4`, so mutation-created genes start at 5 and
    /// hidden neurons at id 6.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::History;
    ///
    /// let history = History::new();
    /// assert_eq!(history.max_gene_innovation(), 4);
    /// assert_eq!(history.max_neuron_id(), 5);
    /// ```
    pub fn new() -> History {
        let gene_innovations = (0..=BIAS_NEURON)
            .map(|source| ((source, OUTPUT_NEURON), source))
            .collect();
        History {
            next_gene_innovation: BIAS_NEURON + 1,
            next_neuron_id: FIRST_HIDDEN_NEURON,
            gene_innovations,
            neuron_innovations: HashMap::default(),
        }
    }

    /// Returns the innovation number previously assigned to a
    /// gene between `source` and `target`, or the next free one.
    pub(crate) fn next_gene_innovation(&self, source: NeuronId, target: NeuronId) -> Innovation {
        *self
            .gene_innovations
            .get(&(source, target))
            .unwrap_or(&self.next_gene_innovation)
    }

    /// Records a gene mutation between `source` and `target`,
    /// if new, and returns its innovation number.
    pub(crate) fn add_gene_innovation(&mut self, source: NeuronId, target: NeuronId) -> Innovation {
        match self.gene_innovations.entry((source, target)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.next_gene_innovation;
                entry.insert(id);
                self.next_gene_innovation += 1;
                id
            }
        }
    }

    /// Returns the innovation numbers previously assigned to
    /// splitting `split_gene`, or the next free ones.
    ///
    /// If `duplicate` is `true` the free numbers are returned
    /// even if the split is already registered. This is needed
    /// when the mutating genome already holds the neuron the
    /// registered split introduced, which would otherwise
    /// duplicate neurons and genes within the same genome.
    pub(crate) fn next_neuron_innovation(&self, split_gene: Innovation, duplicate: bool) -> NeuronSplit {
        match self.neuron_innovations.get(&split_gene) {
            Some(split) if !duplicate => *split,
            _ => (
                self.next_gene_innovation,
                self.next_neuron_id,
                self.next_gene_innovation + 1,
            ),
        }
    }

    /// Records a neuron mutation splitting `split_gene`, which runs
    /// between `endpoints`, and returns its innovation numbers.
    /// See [`next_neuron_innovation`] for the meaning of `duplicate`.
    ///
    /// [`next_neuron_innovation`]: History::next_neuron_innovation
    pub(crate) fn add_neuron_innovation(
        &mut self,
        split_gene: Innovation,
        endpoints: (NeuronId, NeuronId),
        duplicate: bool,
    ) -> NeuronSplit {
        match self.neuron_innovations.get(&split_gene) {
            Some(split) if !duplicate => *split,
            _ => {
                let (source, target) = endpoints;
                let new_neuron = self.next_neuron_id;
                self.next_neuron_id += 1;

                let input_gene = self.add_gene_innovation(source, new_neuron);
                let output_gene = self.add_gene_innovation(new_neuron, target);
                let split = (input_gene, new_neuron, output_gene);

                self.neuron_innovations.insert(split_gene, split);
                split
            }
        }
    }

    /// Returns the highest gene innovation number generated.
    pub fn max_gene_innovation(&self) -> Innovation {
        self.next_gene_innovation - 1
    }

    /// Returns the highest neuron id generated.
    pub fn max_neuron_id(&self) -> NeuronId {
        self.next_neuron_id - 1
    }

    /// Returns an iterator over the complete record of gene
    /// innovations, as `((source, target), innovation)`.
    /// No ordering is guaranteed.
    pub fn gene_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&(NeuronId, NeuronId), &Innovation)> {
        self.gene_innovations.iter()
    }

    /// Returns an iterator over the complete record of neuron
    /// innovations, as `(split gene, (input gene, new neuron, output gene))`.
    /// No ordering is guaranteed.
    pub fn neuron_innovation_history(&self) -> impl Iterator<Item = (&Innovation, &NeuronSplit)> {
        self.neuron_innovations.iter()
    }
}

impl Default for History {
    fn default() -> History {
        History::new()
    }
}

/// Tuple keys are not valid map keys in every format (JSON
/// among them), so gene innovations are stored as a sorted
/// list of `((source, target), innovation)` entries.
mod endpoint_entries {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &HashMap<(NeuronId, NeuronId), Innovation, RandomState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_unstable();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(NeuronId, NeuronId), Innovation, RandomState>, D::Error> {
        let entries: Vec<((NeuronId, NeuronId), Innovation)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
