//! Checkpoint system for saving and resuming evolutionary runs.

use crate::config::NeatConfig;
use crate::genome::Genome;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Complete resumable state of an evolutionary run.
///
/// Restoring the id counters alongside the population keeps innovation
/// markers and neuron uids globally unique across a save/resume boundary.
/// Species are not saved; they are rebuilt by the first speciation pass
/// after resuming, against the saved compatibility threshold.
#[derive(Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Number of generation transitions completed
    pub generation_number: u64,
    /// The generation that will be speciated and evaluated next
    pub population: Vec<Genome>,
    /// Next value the innovation marker generator will hand out
    pub innovation_next: u64,
    /// Next value the neuron uid generator will hand out
    pub neuron_uid_next: u64,
    /// Compatibility threshold at the time of saving
    pub compatibility_threshold: f64,
    /// Run configuration
    pub config: NeatConfig,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    /// Create a new checkpoint
    pub fn new(
        generation_number: u64,
        population: Vec<Genome>,
        innovation_next: u64,
        neuron_uid_next: u64,
        compatibility_threshold: f64,
        config: NeatConfig,
    ) -> Self {
        Self {
            version: Self::VERSION,
            generation_number,
            population,
            innovation_next,
            neuron_uid_next,
            compatibility_threshold,
            config,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write magic bytes for identification
        writer.write_all(b"NEAT")?;

        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        // Check magic bytes
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != b"NEAT" {
            return Err(CheckpointError::InvalidFormat(
                "Invalid magic bytes".to_string(),
            ));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for CheckpointError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}
