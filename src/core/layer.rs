//! Module implementing a fully-connected layer of spiking neurons.
use serde::{Deserialize, Serialize};

use crate::core::neuron::{Neuron, NeuronModel};
use crate::core::partition::WorkerPool;
use crate::core::weights::{WeightMatrix, WeightSeeder};
use crate::error::SNNError;

/// A layer of neurons, all connected to every line of the layer input.
///
/// The layer owns its output vector, which is read in place by the next layer.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Layer {
    id: usize,
    num_inputs: usize,
    neurons: Vec<Neuron>,
    weights: WeightMatrix,
    output: Vec<bool>,
}

impl Layer {
    /// Create a new layer with zero weights and silent output.
    /// Returns an error if the layer has no neuron or no input.
    pub fn build(
        id: usize,
        num_neurons: usize,
        num_inputs: usize,
        model: NeuronModel,
        initial_potential: f64,
    ) -> Result<Self, SNNError> {
        if num_neurons == 0 {
            return Err(SNNError::IncompatibleTopology(format!(
                "Layer {} has no neuron",
                id
            )));
        }
        if num_inputs == 0 {
            return Err(SNNError::IncompatibleTopology(format!(
                "Layer {} has no input",
                id
            )));
        }
        Ok(Layer {
            id,
            num_inputs,
            neurons: vec![Neuron::new(model, initial_potential, num_inputs); num_neurons],
            weights: WeightMatrix::zeros(num_neurons, num_inputs),
            output: vec![false; num_neurons],
        })
    }

    /// Returns the position of the layer in the network.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the number of neurons of the layer.
    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the number of input lines of the layer.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Returns a slice of the neurons of the layer.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Returns a reference to a specific neuron, if any.
    pub fn neuron(&self, index: usize) -> Option<&Neuron> {
        self.neurons.get(index)
    }

    /// Returns the weights of the layer.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Returns the output of the layer, i.e., which neurons fired during the last timestep.
    pub fn output(&self) -> &[bool] {
        &self.output
    }

    /// Bring every neuron to the initial state of the model.
    pub fn instantiate(&mut self, pool: &WorkerPool, model: NeuronModel, initial_potential: f64) {
        let id = self.id;
        pool.fork(self.neurons.iter_mut(), |worker, index, neuron| {
            neuron.instantiate(model, initial_potential);
            log::trace!(
                "Layer {}: neuron {} instantiated by worker {} at potential {:.2}",
                id,
                index,
                worker,
                neuron.potential()
            );
        });
    }

    /// Populate the weight matrix, the row of every neuron being written by the worker owning that neuron.
    pub fn seed_weights(&mut self, pool: &WorkerPool, seeder: &dyn WeightSeeder) -> Result<(), SNNError> {
        seeder.check_shape(self.neurons.len(), self.num_inputs)?;
        pool.fork(self.weights.rows_mut(), |worker, index, row| {
            seeder.seed_row(worker, index, row)
        });
        Ok(())
    }

    /// Silence the whole output of the layer.
    pub fn zero_output(&mut self, pool: &WorkerPool) {
        pool.fork(self.output.iter_mut(), |_, _, slot| *slot = false);
    }

    /// Integrate the input of the current timestep and fire.
    ///
    /// Every neuron sums the weights of its active input lines, then advances its dynamics with that current.
    /// The output slot of a neuron is set if it fires; it is left untouched otherwise.
    pub fn integrate(&mut self, pool: &WorkerPool, input: &[bool]) -> Result<(), SNNError> {
        if input.len() != self.num_inputs {
            return Err(SNNError::IncompatibleTopology(format!(
                "Layer {} expects {} inputs, got {}",
                self.id,
                self.num_inputs,
                input.len()
            )));
        }

        let id = self.id;
        let items = self
            .neurons
            .iter_mut()
            .zip(self.output.iter_mut())
            .zip(self.weights.rows());
        pool.fork(items, |worker, index, ((neuron, slot), weights)| {
            let current: f64 = weights
                .iter()
                .zip(input)
                .filter(|(_, active)| **active)
                .map(|(weight, _)| weight)
                .sum();
            if neuron.step(current) {
                *slot = true;
            }
            log::trace!(
                "Layer {}: neuron {} (worker {}) received {:.2}, potential {:.2}, spiked {}",
                id,
                index,
                worker,
                current,
                neuron.potential(),
                neuron.spiked()
            );
        });
        Ok(())
    }
}
