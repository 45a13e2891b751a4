//! Feed-forward network of fully-connected layers, simulated in lock-step.
use crate::core::input::InputStream;
use crate::core::layer::Layer;
use crate::core::neuron::NeuronModel;
use crate::core::record::Observer;
use crate::core::scheduler::{Phase, PhaseScheduler};
use crate::core::weights::WeightSeeder;
use crate::error::SNNError;
use crate::DEFAULT_NUM_WORKERS;

/// Builder of a [`Network`]. All sizes are fixed once the network is built.
pub struct NetworkBuilder {
    num_inputs: usize,
    layers: Vec<(usize, Box<dyn WeightSeeder>)>,
    model: Option<NeuronModel>,
    initial_potential: f64,
    num_workers: usize,
    input: Option<InputStream>,
}

impl NetworkBuilder {
    /// Start a network whose first layer reads `num_inputs` primary input lines.
    pub fn new(num_inputs: usize) -> Self {
        NetworkBuilder {
            num_inputs,
            layers: vec![],
            model: None,
            initial_potential: 0.0,
            num_workers: DEFAULT_NUM_WORKERS,
            input: None,
        }
    }

    /// Append a layer of `num_neurons` neurons, whose weights are provided by `seeder`.
    pub fn layer<S: WeightSeeder + 'static>(mut self, num_neurons: usize, seeder: S) -> Self {
        self.layers.push((num_neurons, Box::new(seeder)));
        self
    }

    /// Append a layer with an already boxed seeder.
    pub fn boxed_layer(mut self, num_neurons: usize, seeder: Box<dyn WeightSeeder>) -> Self {
        self.layers.push((num_neurons, seeder));
        self
    }

    /// Set the neuron dynamics of the network.
    pub fn model(mut self, model: NeuronModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the potential of the neurons when they are instantiated.
    pub fn initial_potential(mut self, initial_potential: f64) -> Self {
        self.initial_potential = initial_potential;
        self
    }

    /// Set the number of workers.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the external input of the network.
    pub fn input(mut self, input: InputStream) -> Self {
        self.input = Some(input);
        self
    }

    /// Build the network, checking that every size fits.
    /// Nothing is simulated yet: the network is in the idle phase.
    pub fn build(self) -> Result<Network, SNNError> {
        let model = self.model.ok_or_else(|| {
            SNNError::InvalidParameters("No neuron model provided".to_string())
        })?;
        model.validate()?;
        if !self.initial_potential.is_finite() {
            return Err(SNNError::InvalidParameters(
                "The initial potential must be finite".to_string(),
            ));
        }

        let input = self.input.ok_or_else(|| {
            SNNError::InvalidParameters("No input stream provided".to_string())
        })?;
        if input.num_timesteps() > 0 && input.num_lines() != self.num_inputs {
            return Err(SNNError::IncompatibleTopology(format!(
                "The input stream has {} lines, the first layer expects {}",
                input.num_lines(),
                self.num_inputs
            )));
        }

        if self.layers.is_empty() {
            return Err(SNNError::IncompatibleTopology(
                "The network has no layer".to_string(),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut seeders = Vec::with_capacity(self.layers.len());
        let mut num_inputs = self.num_inputs;
        for (id, (num_neurons, seeder)) in self.layers.into_iter().enumerate() {
            let layer = Layer::build(id, num_neurons, num_inputs, model, self.initial_potential)?;
            seeder.check_shape(num_neurons, num_inputs)?;
            num_inputs = num_neurons;
            layers.push(layer);
            seeders.push(seeder);
        }

        let scheduler = PhaseScheduler::build(self.num_workers)?;
        log::info!(
            "Network built: {} inputs, layers of {:?} neurons, {} workers, {} timesteps",
            self.num_inputs,
            layers.iter().map(|layer| layer.num_neurons()).collect::<Vec<usize>>(),
            self.num_workers,
            input.num_timesteps()
        );

        Ok(Network {
            layers,
            seeders,
            model,
            initial_potential: self.initial_potential,
            input,
            scheduler,
            timestep: 0,
        })
    }
}

/// A network of layers, owning every buffer of the simulation.
pub struct Network {
    layers: Vec<Layer>,
    seeders: Vec<Box<dyn WeightSeeder>>,
    model: NeuronModel,
    initial_potential: f64,
    input: InputStream,
    scheduler: PhaseScheduler,
    timestep: usize,
}

impl Network {
    /// Returns the layers of the network, in feed-forward order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns a specific layer, if any.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Returns the number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the neuron dynamics of the network.
    pub fn model(&self) -> &NeuronModel {
        &self.model
    }

    /// Returns the external input of the network.
    pub fn input(&self) -> &InputStream {
        &self.input
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    /// Returns the number of timesteps already simulated.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// Returns the total number of timesteps to simulate.
    pub fn num_timesteps(&self) -> usize {
        self.input.num_timesteps()
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.scheduler.pool().num_workers()
    }

    /// Returns the output of the last layer.
    pub fn output(&self) -> &[bool] {
        self.layers.last().map(|layer| layer.output()).unwrap_or(&[])
    }

    /// Instantiate the neurons, then seed the weights of every layer.
    pub fn init(&mut self) -> Result<(), SNNError> {
        self.init_with(&mut ())
    }

    /// Same as [`Network::init`], notifying an observer.
    pub fn init_with<O: Observer>(&mut self, observer: &mut O) -> Result<(), SNNError> {
        log::info!("Instantiating the network...");
        self.scheduler
            .init_neurons(&mut self.layers, self.model, self.initial_potential)?;
        observer.phase_completed(Phase::NeuronInit, None, &self.layers);

        self.scheduler.init_weights(&mut self.layers, &self.seeders)?;
        observer.phase_completed(Phase::WeightInit, None, &self.layers);
        log::info!("Network instantiated!");
        Ok(())
    }

    /// Simulate one timestep.
    /// Returns an error if the network is not initialized or if every timestep has been simulated.
    pub fn step(&mut self) -> Result<(), SNNError> {
        self.step_with(&mut ())
    }

    /// Same as [`Network::step`], notifying an observer.
    pub fn step_with<O: Observer>(&mut self, observer: &mut O) -> Result<(), SNNError> {
        let t = self.timestep;
        let input = self.input.row(t).ok_or_else(|| {
            SNNError::OutOfBounds(format!(
                "Timestep {} is beyond the {} timesteps of the input",
                t,
                self.input.num_timesteps()
            ))
        })?;

        self.scheduler.zero_outputs(&mut self.layers)?;
        observer.phase_completed(Phase::OutputZero, Some(t), &self.layers);

        self.scheduler
            .integrate(&mut self.layers, input, |layer_input, layer| {
                log::debug!(
                    "Timestep {}, layer {}: output {:?}",
                    t,
                    layer.id(),
                    layer.output().iter().map(|&o| o as u8).collect::<Vec<u8>>()
                );
                observer.layer_integrated(t, layer_input, layer);
            })?;
        observer.phase_completed(Phase::Integrate, Some(t), &self.layers);

        observer.timestep_completed(t, &self.layers);
        self.timestep += 1;
        Ok(())
    }

    /// Run the whole simulation: initialize the network if needed, simulate every remaining timestep and close.
    pub fn run<O: Observer>(&mut self, observer: &mut O) -> Result<(), SNNError> {
        if self.phase() == Phase::Idle {
            self.init_with(observer)?;
        }

        log::info!("Starting simulation...");
        while self.timestep < self.num_timesteps() {
            self.step_with(observer)?;
        }
        self.scheduler.finish()?;
        log::info!(
            "Simulation completed successfully after {} timesteps!",
            self.timestep
        );
        Ok(())
    }
}
