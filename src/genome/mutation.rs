//! Structural and weight mutation operators.

use super::{ConnectionGene, Genome, NeuronGene, NeuronLayer};
use crate::innovation::InnovationGenerator;
use rand::Rng;

/// Probability of perturbing a weight rather than replacing it outright
/// during weight mutation.
const WEIGHT_PERTURB_PROBABILITY: f64 = 0.9;

impl Genome {
    /// Try to connect two randomly chosen neurons without creating a cycle.
    ///
    /// Up to `max_attempts` times: draw two neurons uniformly at random and
    /// reject the pair if both are inputs, both are outputs, they are the
    /// same neuron, or the edge (oriented from the lower layer to the higher
    /// layer; equal-layer pairs keep draw order) would close a cycle. If the
    /// edge already exists disabled it is re-enabled and reported as success;
    /// if it exists enabled the attempt counts as failed. Otherwise a new
    /// gene is created with a fresh innovation marker and a uniform (-1, 1)
    /// weight.
    ///
    /// Returns whether a connection was added or re-enabled. Exhausting the
    /// attempt budget is expected behaviour, not an error.
    pub fn add_connection_mutation<R: Rng>(
        &mut self,
        rng: &mut R,
        innovation: &InnovationGenerator,
        max_attempts: u32,
    ) -> bool {
        if self.neurons.len() < 2 {
            return false;
        }

        for _ in 0..max_attempts {
            let first = self.neurons[rng.gen_range(0..self.neurons.len())];
            let second = self.neurons[rng.gen_range(0..self.neurons.len())];

            if (first.layer == NeuronLayer::Input && second.layer == NeuronLayer::Input)
                || (first.layer == NeuronLayer::Output && second.layer == NeuronLayer::Output)
            {
                continue;
            }
            if first.uid == second.uid {
                continue;
            }

            // Orient the edge so the lower-layer neuron is the source
            let (from, to) = if second.layer < first.layer {
                (second.uid, first.uid)
            } else {
                (first.uid, second.uid)
            };

            if let Some(existing) = self.connection_between(from, to) {
                if self.connections[existing].enabled {
                    // Already wired up; counts as a failed attempt
                    continue;
                }
                self.connections[existing].enable();
                return true;
            }

            if self.would_cycle(from, to) {
                continue;
            }

            self.push_connection(ConnectionGene::new(
                from,
                to,
                innovation.next(),
                rng.gen_range(-1.0..1.0),
                true,
            ));
            return true;
        }

        false
    }

    /// Split a randomly chosen connection with a new hidden neuron.
    ///
    /// The chosen connection is disabled and replaced by two enabled
    /// connections, each with a fresh innovation marker: source -> new with
    /// weight 1.0, and new -> target carrying the original weight. The
    /// multiplicative contribution of the original edge is preserved exactly.
    /// A genome without connections is left untouched.
    pub fn add_neuron_mutation<R: Rng>(
        &mut self,
        rng: &mut R,
        neuron_uids: &InnovationGenerator,
        innovation: &InnovationGenerator,
    ) {
        if self.connections.is_empty() {
            return;
        }

        let split = rng.gen_range(0..self.connections.len());
        let original = self.connections[split];
        self.connections[split].disable();

        let uid = neuron_uids.next();
        self.push_neuron(NeuronGene::new(uid, NeuronLayer::Hidden));
        self.push_connection(ConnectionGene::new(
            original.from,
            uid,
            innovation.next(),
            1.0,
            true,
        ));
        self.push_connection(ConnectionGene::new(
            uid,
            original.to,
            innovation.next(),
            original.weight,
            true,
        ));
    }

    /// Mutate every connection weight independently: with probability 0.9
    /// multiply it by a uniform (-2, 2) factor, otherwise replace it with a
    /// fresh uniform (-2, 2) value.
    pub fn weight_mutation<R: Rng>(&mut self, rng: &mut R) {
        for connection in &mut self.connections {
            if rng.gen::<f64>() < WEIGHT_PERTURB_PROBABILITY {
                connection.weight *= rng.gen_range(-2.0..2.0);
            } else {
                connection.weight = rng.gen_range(-2.0..2.0);
            }
        }
    }
}
