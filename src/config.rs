//! Configuration of a simulation, loaded from a JSON file.
//!
//! ```
//! use cluster_snn::config::NetworkConfig;
//!
//! let config: NetworkConfig = serde_json::from_str(r#"{
//!     "num_workers": 8,
//!     "model": { "lif": { "threshold": 6.0, "reset": 2.0, "tau": 10.0 } },
//!     "initial_potential": 0.0,
//!     "input": { "explicit": { "rows": [[1, 0, 0, 1], [0, 0, 0, 1]] } },
//!     "layers": [
//!         { "neurons": 4, "weights": { "explicit": [[3, 2, 4, 1], [4, 5, 6, 4], [3, 10, 1, -5], [4, 1, 2, -4]] } },
//!         { "neurons": 2, "weights": { "random_int": { "low": -5, "high": 5, "seed": 7 } } }
//!     ]
//! }"#).unwrap();
//!
//! let mut network = config.build().unwrap();
//! network.run(&mut ()).unwrap();
//! assert_eq!(network.timestep(), 2);
//! ```
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::input::InputStream;
use crate::core::network::{Network, NetworkBuilder};
use crate::core::neuron::NeuronModel;
use crate::core::weights::{Explicit, RandomInt, WeightSeeder, WorkerOffset};
use crate::error::SNNError;
use crate::DEFAULT_NUM_WORKERS;

/// How the external input of the network is obtained.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputConfig {
    /// Binary activations, one row per timestep.
    Explicit { rows: Vec<Vec<u8>> },
    /// Binary activations, one row per input line and one column per timestep.
    Lines { lines: Vec<Vec<u8>> },
    /// Every line is active independently with probability `rate` at every timestep.
    Bernoulli {
        num_lines: usize,
        timesteps: usize,
        rate: f64,
        seed: u64,
    },
}

impl InputConfig {
    /// Build the input stream.
    pub fn build(&self) -> Result<InputStream, SNNError> {
        match self {
            InputConfig::Explicit { rows } => InputStream::from_rows(rows),
            InputConfig::Lines { lines } => InputStream::from_lines(lines),
            InputConfig::Bernoulli {
                num_lines,
                timesteps,
                rate,
                seed,
            } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                InputStream::rand(*num_lines, *timesteps, *rate, &mut rng)
            }
        }
    }

    /// Returns the number of input lines.
    pub fn num_lines(&self) -> usize {
        match self {
            InputConfig::Explicit { rows } => rows.first().map_or(0, |row| row.len()),
            InputConfig::Lines { lines } => lines.len(),
            InputConfig::Bernoulli { num_lines, .. } => *num_lines,
        }
    }
}

/// How the weights of a layer are seeded.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightConfig {
    /// The full weight matrix, one row per neuron.
    Explicit(Vec<Vec<f64>>),
    /// Every weight is the identifier of the seeding worker plus `offset`.
    WorkerOffset {
        #[serde(default = "default_offset")]
        offset: f64,
    },
    /// Integer weights drawn uniformly in `[low, high]`.
    RandomInt { low: i64, high: i64, seed: u64 },
}

fn default_offset() -> f64 {
    WorkerOffset::default().offset
}

impl WeightConfig {
    /// Build the weight seeder.
    pub fn build(&self) -> Result<Box<dyn WeightSeeder>, SNNError> {
        let seeder: Box<dyn WeightSeeder> = match self {
            WeightConfig::Explicit(rows) => Box::new(Explicit::from_rows(rows.clone())?),
            WeightConfig::WorkerOffset { offset } => Box::new(WorkerOffset { offset: *offset }),
            WeightConfig::RandomInt { low, high, seed } => {
                Box::new(RandomInt::build(*low, *high, *seed)?)
            }
        };
        Ok(seeder)
    }
}

/// Configuration of a layer.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// The number of neurons of the layer.
    pub neurons: usize,
    /// The weights of the layer.
    pub weights: WeightConfig,
}

/// Configuration of a whole simulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The number of workers.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    /// The neuron dynamics.
    pub model: NeuronModel,
    /// The potential of the neurons when they are instantiated.
    #[serde(default)]
    pub initial_potential: f64,
    /// The external input, which also sets the number of timesteps.
    pub input: InputConfig,
    /// The layers, in feed-forward order.
    pub layers: Vec<LayerConfig>,
}

fn default_num_workers() -> usize {
    DEFAULT_NUM_WORKERS
}

impl NetworkConfig {
    /// Build the network described by the configuration.
    pub fn build(&self) -> Result<Network, SNNError> {
        let mut builder = NetworkBuilder::new(self.input.num_lines())
            .model(self.model)
            .initial_potential(self.initial_potential)
            .num_workers(self.num_workers)
            .input(self.input.build()?);
        for layer in self.layers.iter() {
            builder = builder.boxed_layer(layer.neurons, layer.weights.build()?);
        }
        builder.build()
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// Load a configuration from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))
    }
}
