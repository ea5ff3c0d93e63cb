//! Neuron and connection genes.

use serde::{Deserialize, Serialize};

/// The layer a neuron belongs to. The ordering matters: connections are
/// oriented from the lower layer to the higher layer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum NeuronLayer {
    Input,
    Hidden,
    Output,
}

/// Gene describing one neuron. The uid is unique for the lifetime of an
/// evolutionary run, assigned by the run's uid generator and never reused.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NeuronGene {
    pub uid: u64,
    pub layer: NeuronLayer,
}

impl NeuronGene {
    pub fn new(uid: u64, layer: NeuronLayer) -> Self {
        Self { uid, layer }
    }
}

// Identity is by uid alone; a uid is only ever issued for one layer.
impl PartialEq for NeuronGene {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(
            self.uid != other.uid || self.layer == other.layer,
            "equal neurons must share a layer"
        );
        self.uid == other.uid
    }
}

impl Eq for NeuronGene {}

impl std::hash::Hash for NeuronGene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

/// Gene describing one directed, weighted connection between two neurons.
///
/// The innovation marker is assigned exactly once, when a structural mutation
/// first creates this edge, and is copied unchanged whenever the gene is
/// inherited. It is the alignment key for crossover and compatibility
/// distance, not a value that can be re-derived from the endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub from: u64,
    pub to: u64,
    pub innovation: u64,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    pub fn new(from: u64, to: u64, innovation: u64, weight: f64, enabled: bool) -> Self {
        Self {
            from,
            to,
            innovation,
            weight,
            enabled,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_ordering() {
        assert!(NeuronLayer::Input < NeuronLayer::Hidden);
        assert!(NeuronLayer::Hidden < NeuronLayer::Output);
    }

    #[test]
    fn test_neuron_identity_by_uid() {
        let a = NeuronGene::new(3, NeuronLayer::Hidden);
        let b = NeuronGene::new(3, NeuronLayer::Hidden);
        let c = NeuronGene::new(4, NeuronLayer::Hidden);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_connection_enable_disable() {
        let mut gene = ConnectionGene::new(0, 1, 0, 0.5, true);
        gene.disable();
        assert!(!gene.enabled);
        gene.enable();
        assert!(gene.enabled);
        // Toggling never touches the rest of the gene
        assert_eq!(gene.weight, 0.5);
        assert_eq!(gene.innovation, 0);
    }
}
