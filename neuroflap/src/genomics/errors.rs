use crate::{Innovation, NeuronId};

use thiserror::Error;

/// An error type indicating that a gene or neuron
/// could not be added to a genome, or that a
/// structural mutation could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// The gene's innovation number is already present in the genome.
    #[error("duplicate gene insertion with id {0} between endpoints {1} -> {2}")]
    DuplicateGene(Innovation, NeuronId, NeuronId),
    /// Another gene already connects the same endpoints.
    #[error("gene insertion with endpoints {1} -> {2} and id {0} shadows gene with same endpoints")]
    DuplicateEndpoints(Innovation, NeuronId, NeuronId),
    /// At least one of the endpoints is absent from the genome.
    #[error("gene insertion between nonexistant endpoint(s) {0} -> {1}")]
    NonexistentEndpoints(NeuronId, NeuronId),
    /// The gene would end at a sensor or bias neuron.
    #[error("gene insertion with sensor or bias neuron {0} as target")]
    InvalidTarget(NeuronId),
    /// The gene would start at the output neuron.
    #[error("gene insertion with output neuron {0} as source")]
    InvalidSource(NeuronId),
    /// The gene would close a cycle.
    #[error("gene insertion {0} -> {1} would create a cycle")]
    CreatesCycle(NeuronId, NeuronId),
    /// The neuron's id is already present in the genome.
    #[error("duplicate neuron insertion with id {0}")]
    DuplicateNeuron(NeuronId),
    /// The neuron's id is reserved for a fixed role.
    #[error("hidden neuron insertion with reserved id {0}")]
    ReservedNeuron(NeuronId),
    /// No further connection can be added without
    /// breaking the feed-forward constraints.
    #[error("connection mutation on fully-connected genome")]
    FullyConnected,
    /// The genome has no enabled gene to split.
    #[error("neuron mutation on genome without enabled genes")]
    NoEnabledGenes,
}
