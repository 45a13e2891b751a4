//! Observation of a running simulation.
//!
//! An [`Observer`] is notified as the phases complete; the [`Recorder`] keeps a snapshot of every layer after every timestep.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::layer::Layer;
use crate::core::scheduler::Phase;
use crate::error::SNNError;

/// Hooks called by the network while it runs. All hooks do nothing by default.
pub trait Observer {
    /// Called once a phase has completed on every layer.
    /// The timestep is `None` for the initialization phases.
    fn phase_completed(&mut self, _phase: Phase, _timestep: Option<usize>, _layers: &[Layer]) {}

    /// Called once a layer has integrated its input, with the input it has read.
    fn layer_integrated(&mut self, _timestep: usize, _input: &[bool], _layer: &Layer) {}

    /// Called at the end of every timestep.
    fn timestep_completed(&mut self, _timestep: usize, _layers: &[Layer]) {}
}

/// An observer that ignores everything.
impl Observer for () {}

/// The state of a layer at the end of a timestep.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LayerSnapshot {
    /// The input read by the layer.
    pub input: Vec<bool>,
    /// The potential of every neuron.
    pub potentials: Vec<f64>,
    /// The recovery variable of every neuron (zero for LIF neurons).
    pub recoveries: Vec<f64>,
    /// Whether every neuron fired.
    pub spiked: Vec<bool>,
    /// The output published to the next layer.
    pub output: Vec<bool>,
}

impl LayerSnapshot {
    /// Take a snapshot of a layer and of the input it has read.
    pub fn new(input: &[bool], layer: &Layer) -> Self {
        LayerSnapshot {
            input: input.to_vec(),
            potentials: layer.neurons().iter().map(|n| n.potential()).collect(),
            recoveries: layer.neurons().iter().map(|n| n.recovery()).collect(),
            spiked: layer.neurons().iter().map(|n| n.spiked()).collect(),
            output: layer.output().to_vec(),
        }
    }

    /// Returns the number of neurons that fired.
    pub fn num_spikes(&self) -> usize {
        self.output.iter().filter(|&&o| o).count()
    }
}

/// The snapshots of every layer at every timestep.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// `timesteps[t][l]` is the snapshot of layer `l` at the end of timestep `t`.
    pub timesteps: Vec<Vec<LayerSnapshot>>,
}

impl SimulationRecord {
    /// Returns the number of recorded timesteps.
    pub fn num_timesteps(&self) -> usize {
        self.timesteps.len()
    }

    /// Returns the snapshot of a layer at a given timestep, if any.
    pub fn snapshot(&self, timestep: usize, layer: usize) -> Option<&LayerSnapshot> {
        self.timesteps.get(timestep).and_then(|layers| layers.get(layer))
    }

    /// Returns the output of the last layer at every timestep.
    pub fn network_output(&self) -> Vec<Vec<bool>> {
        self.timesteps
            .iter()
            .filter_map(|layers| layers.last().map(|snapshot| snapshot.output.clone()))
            .collect()
    }

    /// Save the record to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// Load a record from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))
    }
}

/// An observer collecting a [`SimulationRecord`].
#[derive(Debug, Default)]
pub struct Recorder {
    record: SimulationRecord,
    current: Vec<LayerSnapshot>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    /// Returns the record collected so far.
    pub fn record(&self) -> &SimulationRecord {
        &self.record
    }

    /// Consume the recorder and return its record.
    pub fn into_record(self) -> SimulationRecord {
        self.record
    }
}

impl Observer for Recorder {
    fn layer_integrated(&mut self, _timestep: usize, input: &[bool], layer: &Layer) {
        self.current.push(LayerSnapshot::new(input, layer));
    }

    fn timestep_completed(&mut self, timestep: usize, _layers: &[Layer]) {
        log::debug!(
            "Timestep {}: {} spikes recorded",
            timestep,
            self.current.iter().map(|s| s.num_spikes()).sum::<usize>()
        );
        self.record.timesteps.push(std::mem::take(&mut self.current));
    }
}
