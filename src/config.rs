//! Run parameters for the evolution engine.
//!
//! Everything the orchestrator needs is supplied explicitly here at
//! construction time; nothing is read from environment variables. YAML
//! load/save is provided for tooling.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameter set for one evolutionary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeatConfig {
    /// Number of genomes per generation (fixed for the whole run)
    pub population_size: usize,
    /// Species count the adaptive compatibility threshold steers towards
    pub target_species: usize,
    /// Worker threads for single-genome evaluation; 0 picks the rayon default
    pub num_threads: usize,
    /// Probability a bred child receives weight mutation
    pub weight_mutation_rate: f64,
    /// Probability a bred child receives add-connection mutation
    pub add_connection_rate: f64,
    /// Probability a bred child receives add-neuron mutation
    pub add_neuron_rate: f64,
    /// Attempt budget per add-connection mutation
    pub add_connection_attempts: u32,
    /// Compatibility distance threshold the first generation is speciated with
    pub initial_compatibility_threshold: f64,
    /// Exponential growth/shrink factor for the threshold, also its floor
    pub compatibility_modifier: f64,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            target_species: 5,
            num_threads: 0,
            weight_mutation_rate: 0.5,
            add_connection_rate: 0.1,
            add_neuron_rate: 0.1,
            add_connection_attempts: 10,
            initial_compatibility_threshold: 10.0,
            compatibility_modifier: 1.7,
        }
    }
}

impl NeatConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: NeatConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".to_string());
        }
        if self.target_species == 0 || self.target_species >= self.population_size {
            return Err("target_species must be between 1 and population_size - 1".to_string());
        }
        for (name, rate) in [
            ("weight_mutation_rate", self.weight_mutation_rate),
            ("add_connection_rate", self.add_connection_rate),
            ("add_neuron_rate", self.add_neuron_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} must be within [0, 1]"));
            }
        }
        if self.add_connection_attempts == 0 {
            return Err("add_connection_attempts must be > 0".to_string());
        }
        if self.initial_compatibility_threshold <= 0.0 {
            return Err("initial_compatibility_threshold must be > 0".to_string());
        }
        if self.compatibility_modifier <= 1.0 {
            return Err("compatibility_modifier must be > 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(NeatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_population() {
        let mut config = NeatConfig::default();
        config.population_size = 1;
        assert!(config.validate().is_err());

        config.population_size = 10;
        config.target_species = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        let mut config = NeatConfig::default();
        config.add_neuron_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = NeatConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: NeatConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.population_size, loaded.population_size);
        assert_eq!(config.compatibility_modifier, loaded.compatibility_modifier);
    }
}
