use crate::{NeuronId, BIAS_NEURON, OUTPUT_NEURON, SENSOR_COUNT};

use serde::{Deserialize, Serialize};

use std::fmt;

/// The fixed function of a neuron, determined by its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronRole {
    /// Input neurons, ids `0..SENSOR_COUNT`.
    Sensor,
    /// The bias neuron, whose activation is pinned to 1.
    Bias,
    /// The single output neuron.
    Output,
    /// Neurons created by structural mutation.
    Hidden,
}

impl NeuronRole {
    /// Returns the role a neuron with the given id plays.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::genomics::NeuronRole;
    ///
    /// assert_eq!(NeuronRole::of(0), NeuronRole::Sensor);
    /// assert_eq!(NeuronRole::of(4), NeuronRole::Bias);
    /// assert_eq!(NeuronRole::of(5), NeuronRole::Output);
    /// assert_eq!(NeuronRole::of(6), NeuronRole::Hidden);
    /// ```
    pub fn of(id: NeuronId) -> NeuronRole {
        match id {
            id if id < SENSOR_COUNT => NeuronRole::Sensor,
            BIAS_NEURON => NeuronRole::Bias,
            OUTPUT_NEURON => NeuronRole::Output,
            _ => NeuronRole::Hidden,
        }
    }

    /// Whether genes may start at neurons of this role.
    pub fn can_be_source(self) -> bool {
        self != NeuronRole::Output
    }

    /// Whether genes may end at neurons of this role.
    pub fn can_be_target(self) -> bool {
        matches!(self, NeuronRole::Hidden | NeuronRole::Output)
    }
}

/// Neurons are the vertices of a genome.
///
/// A neuron doesn't own its genes: it keeps the
/// positions of its outgoing genes within the
/// owning genome's gene list.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Neuron {
    id: NeuronId,
    role: NeuronRole,
    outgoing: Vec<usize>,
}

impl Neuron {
    /// Creates a neuron without outgoing genes,
    /// with the role implied by `id`.
    pub fn new(id: NeuronId) -> Neuron {
        Neuron {
            id,
            role: NeuronRole::of(id),
            outgoing: vec![],
        }
    }

    /// Returns the neuron's id.
    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Returns the neuron's role.
    pub fn role(&self) -> NeuronRole {
        self.role
    }

    /// Returns the positions of the neuron's outgoing
    /// genes in the owning genome's gene list.
    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }

    pub(super) fn add_outgoing(&mut self, gene_index: usize) {
        self.outgoing.push(gene_index);
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{:?}, OUT: {:?}]", self.id, self.role, self.outgoing)
    }
}
