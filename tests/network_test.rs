use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cluster_snn::core::input::InputStream;
use cluster_snn::core::layer::Layer;
use cluster_snn::core::network::{Network, NetworkBuilder};
use cluster_snn::core::neuron::{IzhikevichParams, LifParams, NeuronModel, NeuronState};
use cluster_snn::core::record::{Observer, Recorder};
use cluster_snn::core::scheduler::Phase;
use cluster_snn::core::weights::{Explicit, RandomInt, WeightMatrix};
use cluster_snn::error::SNNError;

const SEED: u64 = 42;

fn lif() -> NeuronModel {
    NeuronModel::Lif(LifParams::build(6.0, 2.0, Some(10.0)).unwrap())
}

fn two_layers() -> Network {
    NetworkBuilder::new(4)
        .layer(
            4,
            Explicit::from_rows(vec![
                vec![3.0, 2.0, 4.0, 1.0],
                vec![4.0, 5.0, 6.0, 4.0],
                vec![3.0, 10.0, 1.0, -5.0],
                vec![4.0, 1.0, 2.0, -4.0],
            ])
            .unwrap(),
        )
        .layer(
            2,
            Explicit::from_rows(vec![vec![0.0, -3.0, 3.0, 8.0], vec![0.0, 5.0, 0.0, 0.0]])
                .unwrap(),
        )
        .model(lif())
        .initial_potential(0.0)
        .input(InputStream::from_rows(&[vec![1, 0, 0, 1], vec![0, 0, 0, 1]]).unwrap())
        .build()
        .unwrap()
}

fn random_network(model: NeuronModel, num_workers: usize) -> Network {
    let initial_potential = match model {
        NeuronModel::Lif(params) => params.reset,
        NeuronModel::Izhikevich(params) => params.c,
    };
    let mut rng = StdRng::seed_from_u64(SEED);
    NetworkBuilder::new(13)
        .layer(21, RandomInt::build(-5, 10, 1).unwrap())
        .layer(9, RandomInt::build(-5, 10, 2).unwrap())
        .layer(5, RandomInt::build(-5, 10, 3).unwrap())
        .model(model)
        .initial_potential(initial_potential)
        .num_workers(num_workers)
        .input(InputStream::rand(13, 30, 0.4, &mut rng).unwrap())
        .build()
        .unwrap()
}

/// Single-threaded reference simulation, from the seeded weights of an initialized network.
struct Oracle {
    model: NeuronModel,
    weights: Vec<WeightMatrix>,
    states: Vec<Vec<NeuronState>>,
}

impl Oracle {
    fn new(network: &Network, initial_potential: f64) -> Self {
        let model = *network.model();
        Oracle {
            model,
            weights: network.layers().iter().map(|layer| layer.weights().clone()).collect(),
            states: network
                .layers()
                .iter()
                .map(|layer| vec![model.initial_state(initial_potential); layer.num_neurons()])
                .collect(),
        }
    }

    fn step(&mut self, input: &[bool]) -> Vec<Vec<bool>> {
        let mut outputs: Vec<Vec<bool>> = vec![];
        for (weights, states) in self.weights.iter().zip(self.states.iter_mut()) {
            let layer_input = outputs.last().cloned().unwrap_or_else(|| input.to_vec());
            let mut output = vec![false; states.len()];
            for (i, state) in states.iter_mut().enumerate() {
                let current: f64 = weights
                    .row(i)
                    .unwrap()
                    .iter()
                    .zip(layer_input.iter())
                    .filter(|(_, active)| **active)
                    .map(|(weight, _)| weight)
                    .sum();
                let (next, spiked) = self.model.transition(*state, current);
                *state = next;
                output[i] = spiked;
            }
            outputs.push(output);
        }
        outputs
    }
}

fn assert_matches_oracle(model: NeuronModel, initial_potential: f64) {
    for num_workers in 1..=12 {
        let mut network = random_network(model, num_workers);
        network.init().unwrap();
        let mut oracle = Oracle::new(&network, initial_potential);

        for t in 0..network.num_timesteps() {
            let expected = oracle.step(network.input().row(t).unwrap());
            network.step().unwrap();
            for (l, layer) in network.layers().iter().enumerate() {
                assert_eq!(layer.output(), expected[l].as_slice());
                for (neuron, state) in layer.neurons().iter().zip(oracle.states[l].iter()) {
                    assert_eq!(neuron.potential(), state.potential);
                    assert_eq!(neuron.recovery(), state.recovery);
                }
            }
        }
    }
}

#[test]
fn test_two_layers_end_to_end() {
    let mut network = two_layers();
    let mut recorder = Recorder::new();
    network.run(&mut recorder).unwrap();
    let record = recorder.into_record();

    assert_eq!(
        record.network_output(),
        vec![vec![false, false], vec![false, false]]
    );
    assert_eq!(
        record.snapshot(0, 0).unwrap().output,
        vec![false, true, false, false]
    );
    assert_eq!(record.snapshot(1, 0).unwrap().output, vec![false; 4]);

    // The second neuron of the first layer fired, then was reset and integrated nothing
    let decay = (-0.1_f64).exp();
    assert_relative_eq!(record.snapshot(0, 0).unwrap().potentials[1], 2.0);
    assert_relative_eq!(record.snapshot(1, 0).unwrap().potentials[1], 2.0 + 4.0 * decay);
}

struct PhaseChecker {
    phases: Vec<Phase>,
    zeroed: bool,
}

impl Observer for PhaseChecker {
    fn phase_completed(&mut self, phase: Phase, _timestep: Option<usize>, layers: &[Layer]) {
        if phase == Phase::OutputZero {
            self.zeroed &= layers
                .iter()
                .all(|layer| layer.output().iter().all(|&o| !o));
        }
        self.phases.push(phase);
    }
}

#[test]
fn test_outputs_zeroed_before_integration() {
    let mut network = two_layers();
    let mut checker = PhaseChecker {
        phases: vec![],
        zeroed: true,
    };
    network.run(&mut checker).unwrap();

    assert!(checker.zeroed);
    assert_eq!(
        checker.phases,
        vec![
            Phase::NeuronInit,
            Phase::WeightInit,
            Phase::OutputZero,
            Phase::Integrate,
            Phase::OutputZero,
            Phase::Integrate,
        ]
    );
}

#[derive(Default)]
struct InputTracker {
    inputs: Vec<(usize, usize)>,
    in_place: bool,
}

impl Observer for InputTracker {
    fn layer_integrated(&mut self, _timestep: usize, input: &[bool], layer: &Layer) {
        self.inputs.push((layer.id(), input.as_ptr() as usize));
    }

    fn timestep_completed(&mut self, _timestep: usize, layers: &[Layer]) {
        self.in_place = self.inputs.iter().all(|&(id, ptr)| {
            id == 0 || layers[id - 1].output().as_ptr() as usize == ptr
        });
        self.inputs.clear();
    }
}

#[test]
fn test_layers_read_previous_output_in_place() {
    let mut network = random_network(lif(), 8);
    let mut tracker = InputTracker::default();
    network.init().unwrap();
    while network.timestep() < network.num_timesteps() {
        network.step_with(&mut tracker).unwrap();
        assert!(tracker.in_place);
    }
}

#[test]
fn test_lif_matches_sequential_simulation() {
    assert_matches_oracle(lif(), 2.0);
}

#[test]
fn test_izhikevich_matches_sequential_simulation() {
    assert_matches_oracle(
        NeuronModel::Izhikevich(IzhikevichParams::regular_spiking()),
        -65.0,
    );
}

#[test]
fn test_random_weights_independent_of_workers() {
    let mut reference = random_network(lif(), 1);
    reference.init().unwrap();
    for num_workers in 2..=12 {
        let mut network = random_network(lif(), num_workers);
        network.init().unwrap();
        for (layer, expected) in network.layers().iter().zip(reference.layers()) {
            assert_eq!(layer.weights(), expected.weights());
        }
    }
}

#[test]
fn test_phase_misuse() {
    let mut network = two_layers();
    assert!(matches!(
        network.step(),
        Err(SNNError::InvalidPhaseTransition { .. })
    ));

    network.init().unwrap();
    assert_eq!(
        network.init(),
        Err(SNNError::InvalidPhaseTransition {
            from: Phase::WeightInit,
            to: Phase::NeuronInit
        })
    );

    network.run(&mut ()).unwrap();
    assert!(matches!(network.step(), Err(SNNError::OutOfBounds(_))));
}
