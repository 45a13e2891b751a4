//! Ordered execution of the simulation phases.
//!
//! Every phase is forked on the worker pool, one layer at a time, and joined before the next one starts.
//! The only cycle allowed is the per-timestep repetition of [`Phase::OutputZero`] and [`Phase::Integrate`].
use serde::{Deserialize, Serialize};

use crate::core::layer::Layer;
use crate::core::neuron::NeuronModel;
use crate::core::partition::WorkerPool;
use crate::core::weights::WeightSeeder;
use crate::error::SNNError;

/// A globally synchronized stage of the simulation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    NeuronInit,
    WeightInit,
    OutputZero,
    Integrate,
    Done,
}

impl Phase {
    /// Returns whether `next` may directly follow this phase.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::NeuronInit)
                | (Phase::NeuronInit, Phase::WeightInit)
                | (Phase::WeightInit, Phase::OutputZero)
                | (Phase::WeightInit, Phase::Done)
                | (Phase::OutputZero, Phase::Integrate)
                | (Phase::Integrate, Phase::OutputZero)
                | (Phase::Integrate, Phase::Done)
        )
    }
}

/// Drives the phases of the simulation on a worker pool.
pub struct PhaseScheduler {
    phase: Phase,
    pool: WorkerPool,
}

impl PhaseScheduler {
    /// Create a new scheduler, in the idle phase, with a pool of `num_workers` workers.
    pub fn build(num_workers: usize) -> Result<Self, SNNError> {
        Ok(PhaseScheduler {
            phase: Phase::Idle,
            pool: WorkerPool::build(num_workers)?,
        })
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn advance(&mut self, next: Phase) -> Result<(), SNNError> {
        if !self.phase.can_advance_to(next) {
            return Err(SNNError::InvalidPhaseTransition {
                from: self.phase,
                to: next,
            });
        }
        log::debug!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Instantiate the neurons of every layer with the initial state of the model.
    pub fn init_neurons(
        &mut self,
        layers: &mut [Layer],
        model: NeuronModel,
        initial_potential: f64,
    ) -> Result<(), SNNError> {
        self.advance(Phase::NeuronInit)?;
        for layer in layers.iter_mut() {
            layer.instantiate(&self.pool, model, initial_potential);
            log::info!("Layer {}: {} neurons instantiated", layer.id(), layer.num_neurons());
        }
        Ok(())
    }

    /// Populate the weight matrix of every layer with its own seeder.
    pub fn init_weights(
        &mut self,
        layers: &mut [Layer],
        seeders: &[Box<dyn WeightSeeder>],
    ) -> Result<(), SNNError> {
        if seeders.len() != layers.len() {
            return Err(SNNError::IncompatibleTopology(format!(
                "{} weight seeders provided for {} layers",
                seeders.len(),
                layers.len()
            )));
        }
        self.advance(Phase::WeightInit)?;
        for (layer, seeder) in layers.iter_mut().zip(seeders) {
            layer.seed_weights(&self.pool, seeder.as_ref())?;
            log::info!(
                "Layer {}: {}x{} weights seeded",
                layer.id(),
                layer.num_neurons(),
                layer.num_inputs()
            );
        }
        Ok(())
    }

    /// Silence the output of every layer.
    pub fn zero_outputs(&mut self, layers: &mut [Layer]) -> Result<(), SNNError> {
        self.advance(Phase::OutputZero)?;
        for layer in layers.iter_mut() {
            layer.zero_output(&self.pool);
        }
        Ok(())
    }

    /// Integrate every layer in feed-forward order.
    /// The first layer reads `input`, every other layer reads the output of its predecessor in place.
    /// The callback is invoked after each layer, with the input the layer has just read.
    pub fn integrate<F>(
        &mut self,
        layers: &mut [Layer],
        input: &[bool],
        mut on_layer: F,
    ) -> Result<(), SNNError>
    where
        F: FnMut(&[bool], &Layer),
    {
        self.advance(Phase::Integrate)?;
        for l in 0..layers.len() {
            let (previous, rest) = layers.split_at_mut(l);
            let layer = &mut rest[0];
            let layer_input = match previous.last() {
                Some(previous) => previous.output(),
                None => input,
            };
            layer.integrate(&self.pool, layer_input)?;
            on_layer(layer_input, layer);
        }
        Ok(())
    }

    /// Close the simulation.
    pub fn finish(&mut self) -> Result<(), SNNError> {
        self.advance(Phase::Done)
    }
}
