//! Phenotype: an executable feed-forward network expressed from a genome.

use crate::genome::{Genome, NeuronLayer};
use std::collections::HashMap;

/// Node activation functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// `max(0, x)`, used for input and hidden nodes
    Relu,
    /// `e^x / (e^x + 1)`, the (0, 1) output used for classification
    Sigmoid,
    /// Identity, the full-range output used for regression
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            // Branch on sign so the exponential never overflows; both forms
            // are the same function
            Self::Sigmoid => {
                if x >= 0.0 {
                    1.0 / (1.0 + (-x).exp())
                } else {
                    let e = x.exp();
                    e / (1.0 + e)
                }
            }
            Self::Linear => x,
        }
    }
}

/// Errors raised when activating a network.
#[derive(Debug, PartialEq)]
pub enum PhenotypeError {
    /// The input slice length does not match the number of input nodes
    InputCountMismatch { expected: usize, found: usize },
    /// Some output node could never be computed; the expressed graph was
    /// cyclic, which a genome produced by the engine never is
    UnresolvedOutputs,
}

impl std::fmt::Display for PhenotypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputCountMismatch { expected, found } => write!(
                f,
                "network has {} input nodes but {} inputs were provided",
                expected, found
            ),
            Self::UnresolvedOutputs => {
                write!(f, "network outputs could not be resolved (cyclic graph)")
            }
        }
    }
}

impl std::error::Error for PhenotypeError {}

struct Node {
    activation: Activation,
    /// (source node index, connection weight), enabled connections only
    incoming: Vec<(usize, f64)>,
}

/// A stateless, executable expression of a genome.
///
/// Nodes are ordered by neuron uid, so the positional meaning of inputs and
/// outputs is stable across clones, mutations and checkpoint round-trips of
/// the same lineage. Disabled connections are not expressed. Input and hidden
/// nodes activate with ReLU; the output activation is chosen at construction.
pub struct Network {
    nodes: Vec<Node>,
    input_indices: Vec<usize>,
    output_indices: Vec<usize>,
}

impl Network {
    /// Express `genome` with sigmoid output nodes, for decision problems
    /// where outputs are read as probabilities or thresholded booleans.
    pub fn sigmoid_output(genome: &Genome) -> Self {
        Self::from_genome(genome, Activation::Sigmoid)
    }

    /// Express `genome` with linear output nodes, for regression problems
    /// needing the full output range.
    pub fn regression(genome: &Genome) -> Self {
        Self::from_genome(genome, Activation::Linear)
    }

    fn from_genome(genome: &Genome, output_activation: Activation) -> Self {
        let mut ordered: Vec<_> = genome.neurons().to_vec();
        ordered.sort_by_key(|neuron| neuron.uid);

        let index_of: HashMap<u64, usize> = ordered
            .iter()
            .enumerate()
            .map(|(index, neuron)| (neuron.uid, index))
            .collect();

        let mut nodes = Vec::with_capacity(ordered.len());
        let mut input_indices = Vec::new();
        let mut output_indices = Vec::new();
        for (index, neuron) in ordered.iter().enumerate() {
            let activation = match neuron.layer {
                NeuronLayer::Output => output_activation,
                _ => Activation::Relu,
            };
            nodes.push(Node {
                activation,
                incoming: Vec::new(),
            });
            match neuron.layer {
                NeuronLayer::Input => input_indices.push(index),
                NeuronLayer::Output => output_indices.push(index),
                NeuronLayer::Hidden => {}
            }
        }

        for connection in genome.connections() {
            if !connection.enabled {
                continue;
            }
            let from = index_of[&connection.from];
            let to = index_of[&connection.to];
            nodes[to].incoming.push((from, connection.weight));
        }

        Self {
            nodes,
            input_indices,
            output_indices,
        }
    }

    /// Number of input nodes, in uid order.
    pub fn num_inputs(&self) -> usize {
        self.input_indices.len()
    }

    /// Number of output nodes, in uid order.
    pub fn num_outputs(&self) -> usize {
        self.output_indices.len()
    }

    /// Compute the network's outputs for the given inputs.
    ///
    /// Inputs feed the input nodes positionally and pass through their ReLU.
    /// Interior values are the weighted sums of ready sources; nodes are
    /// swept repeatedly until every output node is ready, which a DAG always
    /// reaches within one pass per node.
    pub fn activate(&self, inputs: &[f64]) -> Result<Vec<f64>, PhenotypeError> {
        if inputs.len() != self.input_indices.len() {
            return Err(PhenotypeError::InputCountMismatch {
                expected: self.input_indices.len(),
                found: inputs.len(),
            });
        }

        let mut values: Vec<Option<f64>> = vec![None; self.nodes.len()];
        for (slot, &index) in self.input_indices.iter().enumerate() {
            values[index] = Some(self.nodes[index].activation.apply(inputs[slot]));
        }

        for _ in 0..=self.nodes.len() {
            if self
                .output_indices
                .iter()
                .all(|&index| values[index].is_some())
            {
                return Ok(self
                    .output_indices
                    .iter()
                    .map(|&index| values[index].unwrap_or_default())
                    .collect());
            }

            for index in 0..self.nodes.len() {
                if values[index].is_some() {
                    continue;
                }
                let node = &self.nodes[index];
                let ready = node
                    .incoming
                    .iter()
                    .all(|&(source, _)| values[source].is_some());
                if !ready {
                    continue;
                }
                let sum: f64 = node
                    .incoming
                    .iter()
                    .map(|&(source, weight)| values[source].unwrap_or_default() * weight)
                    .sum();
                values[index] = Some(node.activation.apply(sum));
            }
        }

        Err(PhenotypeError::UnresolvedOutputs)
    }
}
