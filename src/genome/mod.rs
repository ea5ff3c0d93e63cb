//! Genome: the evolvable graph representation of one candidate network.

mod crossover;
mod genes;
mod mutation;

pub use crossover::{compatibility_distance, crossover};
pub use genes::{ConnectionGene, NeuronGene, NeuronLayer};

use crate::innovation::InnovationGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A genome is an ordered list of neuron genes plus an ordered list of
/// connection genes referencing neurons by uid. The flat, uid-addressed
/// representation makes deep copy a plain `Clone` and makes read-only sharing
/// across evaluator threads safe.
///
/// Invariant: the directed connection graph is acyclic. Disabled connections
/// are included when checking, since a disabled edge can be re-enabled by a
/// later mutation. The invariant is maintained purely by refusing to create
/// cycle-inducing connections; nothing ever repairs a genome after the fact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Genome {
    neurons: Vec<NeuronGene>,
    connections: Vec<ConnectionGene>,
}

impl Genome {
    /// Create an empty genome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the customary seed topology: `num_inputs` input neurons fully
    /// connected to `num_outputs` output neurons, every edge enabled with
    /// weight 0 and a fresh innovation marker.
    pub fn fully_connected(
        num_inputs: usize,
        num_outputs: usize,
        neuron_uids: &InnovationGenerator,
        innovation: &InnovationGenerator,
    ) -> Self {
        let mut genome = Self::new();

        let inputs: Vec<u64> = (0..num_inputs)
            .map(|_| {
                let uid = neuron_uids.next();
                genome.push_neuron(NeuronGene::new(uid, NeuronLayer::Input));
                uid
            })
            .collect();
        let outputs: Vec<u64> = (0..num_outputs)
            .map(|_| {
                let uid = neuron_uids.next();
                genome.push_neuron(NeuronGene::new(uid, NeuronLayer::Output));
                uid
            })
            .collect();

        for &from in &inputs {
            for &to in &outputs {
                genome.push_connection(ConnectionGene::new(from, to, innovation.next(), 0.0, true));
            }
        }

        genome
    }

    pub fn neurons(&self) -> &[NeuronGene] {
        &self.neurons
    }

    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    /// Append a neuron gene.
    pub fn push_neuron(&mut self, neuron: NeuronGene) {
        self.neurons.push(neuron);
    }

    /// Append a connection gene. The caller is responsible for the acyclicity
    /// invariant; mutation operators check before calling this.
    pub fn push_connection(&mut self, connection: ConnectionGene) {
        self.connections.push(connection);
    }

    pub fn neuron_by_uid(&self, uid: u64) -> Option<&NeuronGene> {
        self.neurons.iter().find(|n| n.uid == uid)
    }

    /// The connection carrying the given innovation marker, if present.
    /// A genome holds at most one connection per marker.
    pub fn connection_by_innovation(&self, innovation: u64) -> Option<&ConnectionGene> {
        debug_assert!(
            self.connections
                .iter()
                .filter(|c| c.innovation == innovation)
                .count()
                <= 1,
            "at most one connection per innovation marker"
        );
        self.connections.iter().find(|c| c.innovation == innovation)
    }

    /// Index of the connection between the given endpoints, if one exists.
    /// Endpoint identity is deliberate here: two independently discovered
    /// edges over the same pair carry different markers but are still the
    /// same structural connection.
    pub fn connection_between(&self, from: u64, to: u64) -> Option<usize> {
        self.connections
            .iter()
            .position(|c| c.from == from && c.to == to)
    }

    /// All innovation markers carried by this genome.
    pub fn innovation_markers(&self) -> Vec<u64> {
        self.connections.iter().map(|c| c.innovation).collect()
    }

    pub fn enabled_connection_count(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Sum of absolute weights over enabled connections.
    pub fn enabled_weight_sum(&self) -> f64 {
        self.connections
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.weight.abs())
            .sum()
    }

    /// Would adding the directed edge `from -> to` close a cycle?
    ///
    /// True iff `to` can already reach `from` along existing edges. Disabled
    /// edges participate: they may be re-enabled later, so they must stay
    /// cycle-free too. Reachability is checked over the whole graph rather
    /// than only from input-rooted paths, so a cycle confined to hidden
    /// neurons is caught as well.
    pub fn would_cycle(&self, from: u64, to: u64) -> bool {
        if from == to {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![to];
        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for connection in &self.connections {
                if connection.from == current && !visited.contains(&connection.to) {
                    stack.push(connection.to);
                }
            }
        }

        false
    }

    /// Whether the connection graph is currently acyclic (disabled edges
    /// included). The engine never produces a cyclic genome; this exists for
    /// validating externally constructed or deserialized genomes.
    pub fn is_acyclic(&self) -> bool {
        // Kahn's algorithm over the uid graph
        let mut indegree: std::collections::HashMap<u64, usize> =
            self.neurons.iter().map(|n| (n.uid, 0)).collect();
        for connection in &self.connections {
            if let Some(d) = indegree.get_mut(&connection.to) {
                *d += 1;
            }
        }

        let mut ready: Vec<u64> = indegree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&uid, _)| uid)
            .collect();
        let mut removed = 0;

        while let Some(uid) = ready.pop() {
            removed += 1;
            for connection in &self.connections {
                if connection.from == uid {
                    if let Some(d) = indegree.get_mut(&connection.to) {
                        *d -= 1;
                        if *d == 0 {
                            ready.push(connection.to);
                        }
                    }
                }
            }
        }

        removed == self.neurons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_neuron_chain() -> Genome {
        let mut genome = Genome::new();
        genome.push_neuron(NeuronGene::new(0, NeuronLayer::Input));
        genome.push_neuron(NeuronGene::new(1, NeuronLayer::Hidden));
        genome.push_neuron(NeuronGene::new(2, NeuronLayer::Output));
        genome.push_connection(ConnectionGene::new(0, 1, 0, 0.5, true));
        genome.push_connection(ConnectionGene::new(1, 2, 1, -0.5, true));
        genome
    }

    #[test]
    fn test_fully_connected_seed() {
        let uids = InnovationGenerator::new();
        let innovation = InnovationGenerator::new();
        let genome = Genome::fully_connected(2, 3, &uids, &innovation);

        assert_eq!(genome.neurons().len(), 5);
        assert_eq!(genome.connections().len(), 6);
        assert_eq!(genome.enabled_connection_count(), 6);
        assert!(genome.is_acyclic());

        // One fresh marker per edge, densely numbered
        let mut markers = genome.innovation_markers();
        markers.sort_unstable();
        assert_eq!(markers, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_lookup_by_marker_and_endpoints() {
        let genome = three_neuron_chain();
        assert_eq!(genome.connection_by_innovation(1).unwrap().from, 1);
        assert!(genome.connection_by_innovation(9).is_none());
        assert_eq!(genome.connection_between(0, 1), Some(0));
        assert_eq!(genome.connection_between(1, 0), None);
    }

    #[test]
    fn test_would_cycle() {
        let genome = three_neuron_chain();
        assert!(genome.would_cycle(2, 0), "closing the chain is a cycle");
        assert!(genome.would_cycle(1, 1), "self loop");
        assert!(!genome.would_cycle(0, 2), "forward shortcut is fine");
    }

    #[test]
    fn test_would_cycle_sees_disabled_edges() {
        let mut genome = three_neuron_chain();
        for i in 0..genome.connections.len() {
            genome.connections[i].disable();
        }
        assert!(genome.would_cycle(2, 0));
    }

    #[test]
    fn test_would_cycle_detects_hidden_only_cycles() {
        // h3 -> h4 unreachable from the input; the check must still see it
        let mut genome = three_neuron_chain();
        genome.push_neuron(NeuronGene::new(3, NeuronLayer::Hidden));
        genome.push_neuron(NeuronGene::new(4, NeuronLayer::Hidden));
        genome.push_connection(ConnectionGene::new(3, 4, 2, 1.0, true));
        assert!(genome.would_cycle(4, 3));
    }

    #[test]
    fn test_is_acyclic() {
        let mut genome = three_neuron_chain();
        assert!(genome.is_acyclic());
        genome.push_connection(ConnectionGene::new(2, 0, 2, 1.0, true));
        assert!(!genome.is_acyclic());
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let genome = three_neuron_chain();
        let mut copy = genome.clone();
        copy.connections[0].weight = 9.0;
        copy.connections[1].disable();
        assert_eq!(genome.connections()[0].weight, 0.5);
        assert!(genome.connections()[1].enabled);
    }
}
