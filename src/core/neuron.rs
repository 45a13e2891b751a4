//! Module implementing the spiking neurons and their dynamics.
//!
//! Two models are available, the Leaky-Integrate-and-Fire (LIF) and the Izhikevich model.
//! The model is fixed for the whole network; a neuron only stores its parameters and its state.
use serde::{Deserialize, Serialize};

use crate::error::SNNError;
use crate::IZHIKEVICH_PEAK;

/// Parameters of a Leaky-Integrate-and-Fire neuron.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct LifParams {
    /// Potential at or above which the neuron fires.
    pub threshold: f64,
    /// Resting potential, toward which the potential leaks and to which it is reset after a spike.
    pub reset: f64,
    /// Leak time constant (in timesteps). No leak if `None`.
    #[serde(default)]
    pub tau: Option<f64>,
}

impl LifParams {
    /// Create new LIF parameters with the specified values.
    /// Returns an error if the threshold does not lie above the reset potential or if the time constant is not positive.
    pub fn build(threshold: f64, reset: f64, tau: Option<f64>) -> Result<Self, SNNError> {
        let params = LifParams { threshold, reset, tau };
        params.validate()?;
        Ok(params)
    }

    /// The reference LIF neuron: threshold at -50, rest and reset at -65, time constant of 10 timesteps.
    pub fn reference() -> Self {
        LifParams {
            threshold: -50.0,
            reset: -65.0,
            tau: Some(10.0),
        }
    }

    /// Check the consistency of the parameters.
    pub fn validate(&self) -> Result<(), SNNError> {
        if !self.threshold.is_finite() || !self.reset.is_finite() {
            return Err(SNNError::InvalidParameters(
                "LIF threshold and reset must be finite".to_string(),
            ));
        }
        if self.threshold <= self.reset {
            return Err(SNNError::InvalidParameters(format!(
                "LIF threshold ({}) must lie above the reset potential ({})",
                self.threshold, self.reset
            )));
        }
        match self.tau {
            Some(tau) if !(tau.is_finite() && tau > 0.0) => Err(SNNError::InvalidParameters(
                format!("LIF time constant must be positive and finite, got {}", tau),
            )),
            _ => Ok(()),
        }
    }

    /// The multiplicative decay applied to the distance to the reset potential at every timestep.
    pub fn decay(&self) -> f64 {
        match self.tau {
            Some(tau) => (-1.0 / tau).exp(),
            None => 1.0,
        }
    }
}

/// Parameters of an Izhikevich neuron.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct IzhikevichParams {
    /// Time scale of the recovery variable.
    pub a: f64,
    /// Sensitivity of the recovery variable to the potential.
    pub b: f64,
    /// After-spike reset value of the potential.
    pub c: f64,
    /// After-spike increment of the recovery variable.
    pub d: f64,
}

impl IzhikevichParams {
    /// Create new Izhikevich parameters, returns an error if any of them is not finite.
    pub fn build(a: f64, b: f64, c: f64, d: f64) -> Result<Self, SNNError> {
        let params = IzhikevichParams { a, b, c, d };
        params.validate()?;
        Ok(params)
    }

    /// Regular spiking neuron, the most common excitatory cortical neuron.
    pub fn regular_spiking() -> Self {
        IzhikevichParams { a: 0.02, b: 0.2, c: -65.0, d: 8.0 }
    }

    /// Fast spiking neuron, typical of inhibitory interneurons.
    pub fn fast_spiking() -> Self {
        IzhikevichParams { a: 0.1, b: 0.2, c: -65.0, d: 2.0 }
    }

    /// Intrinsically bursting neuron.
    pub fn intrinsically_bursting() -> Self {
        IzhikevichParams { a: 0.02, b: 0.2, c: -55.0, d: 4.0 }
    }

    /// Chattering neuron.
    pub fn chattering() -> Self {
        IzhikevichParams { a: 0.02, b: 0.2, c: -50.0, d: 2.0 }
    }

    /// Check the consistency of the parameters.
    pub fn validate(&self) -> Result<(), SNNError> {
        if [self.a, self.b, self.c, self.d].iter().all(|p| p.is_finite()) {
            Ok(())
        } else {
            Err(SNNError::InvalidParameters(
                "Izhikevich parameters must be finite".to_string(),
            ))
        }
    }
}

/// The dynamical state persisted by a neuron between two timesteps.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NeuronState {
    /// The membrane potential (v in the Izhikevich model).
    pub potential: f64,
    /// The recovery variable (u in the Izhikevich model), always zero for LIF neurons.
    pub recovery: f64,
}

/// The neuron dynamics shared by all neurons of a network.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeuronModel {
    Lif(LifParams),
    Izhikevich(IzhikevichParams),
}

impl NeuronModel {
    /// Check the consistency of the model parameters.
    pub fn validate(&self) -> Result<(), SNNError> {
        match self {
            NeuronModel::Lif(params) => params.validate(),
            NeuronModel::Izhikevich(params) => params.validate(),
        }
    }

    /// The state of a freshly instantiated neuron at the given potential.
    pub fn initial_state(&self, initial_potential: f64) -> NeuronState {
        match self {
            NeuronModel::Lif(_) => NeuronState {
                potential: initial_potential,
                recovery: 0.0,
            },
            NeuronModel::Izhikevich(params) => NeuronState {
                potential: initial_potential,
                recovery: params.b * initial_potential,
            },
        }
    }

    /// Advance the state by one timestep, given the synaptic current accumulated during that timestep.
    /// Returns the new state and whether the neuron fired.
    ///
    /// For LIF neurons, the current is first integrated into the potential, then the potential leaks toward the reset potential, then the threshold is checked.
    /// For Izhikevich neurons, a single Euler step is taken, where both updates use the potential at the start of the step.
    pub fn transition(&self, state: NeuronState, current: f64) -> (NeuronState, bool) {
        match self {
            NeuronModel::Lif(params) => {
                let charged = state.potential + current;
                let potential = params.reset + (charged - params.reset) * params.decay();
                if potential >= params.threshold {
                    (
                        NeuronState {
                            potential: params.reset,
                            recovery: state.recovery,
                        },
                        true,
                    )
                } else {
                    (
                        NeuronState {
                            potential,
                            recovery: state.recovery,
                        },
                        false,
                    )
                }
            }
            NeuronModel::Izhikevich(params) => {
                let v = state.potential;
                let u = state.recovery;
                let potential = v + 0.04 * v * v + 5.0 * v + 140.0 - u + current;
                let recovery = u + params.a * (params.b * v - u);
                if potential >= IZHIKEVICH_PEAK {
                    (
                        NeuronState {
                            potential: params.c,
                            recovery: recovery + params.d,
                        },
                        true,
                    )
                } else {
                    (NeuronState { potential, recovery }, false)
                }
            }
        }
    }
}

/// Represents a spiking neuron of a layer.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Neuron {
    model: NeuronModel,
    state: NeuronState,
    spiked: bool,
    num_inputs: usize,
}

impl Neuron {
    /// Create a new neuron with the provided model, at the model's initial state for the given potential.
    pub fn new(model: NeuronModel, initial_potential: f64, num_inputs: usize) -> Self {
        Neuron {
            model,
            state: model.initial_state(initial_potential),
            spiked: false,
            num_inputs,
        }
    }

    /// Reinstantiate the neuron: set its model and reset its state and spike flag.
    pub fn instantiate(&mut self, model: NeuronModel, initial_potential: f64) {
        self.model = model;
        self.state = model.initial_state(initial_potential);
        self.spiked = false;
    }

    /// Integrate the input current over one timestep and fire if needed.
    /// Returns whether the neuron fired.
    pub fn step(&mut self, current: f64) -> bool {
        let (state, spiked) = self.model.transition(self.state, current);
        self.state = state;
        self.spiked = spiked;
        spiked
    }

    /// Returns the model of the neuron.
    pub fn model(&self) -> &NeuronModel {
        &self.model
    }

    /// Returns the state of the neuron.
    pub fn state(&self) -> NeuronState {
        self.state
    }

    /// Returns the membrane potential of the neuron.
    pub fn potential(&self) -> f64 {
        self.state.potential
    }

    /// Returns the recovery variable of the neuron (zero for LIF neurons).
    pub fn recovery(&self) -> f64 {
        self.state.recovery
    }

    /// Returns whether the neuron fired during the last timestep.
    pub fn spiked(&self) -> bool {
        self.spiked
    }

    /// Returns the number of inputs of the neuron.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }
}
