//! This crate provides tools for simulating layered spiking neural networks (SNNs) on a fixed pool of workers.
//!
//! The neurons of every layer are statically partitioned across the workers, in round-robin.
//! The simulation proceeds in barrier-synchronized phases: neuron instantiation, weight seeding, then, at every timestep, output reset and integrate-and-fire, one layer after the other.
//!
//! # Creating Networks
//!
//! ## From Scratch
//!
//! ```rust
//! use cluster_snn::core::input::InputStream;
//! use cluster_snn::core::network::NetworkBuilder;
//! use cluster_snn::core::neuron::{IzhikevichParams, NeuronModel};
//! use cluster_snn::core::weights::RandomInt;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let input = InputStream::rand(16, 10, 0.3, &mut rng).unwrap();
//!
//! let network = NetworkBuilder::new(16)
//!     .layer(16, RandomInt::build(-5, 5, 1).unwrap())
//!     .layer(14, RandomInt::build(-5, 5, 2).unwrap())
//!     .layer(12, RandomInt::build(-5, 5, 3).unwrap())
//!     .model(NeuronModel::Izhikevich(IzhikevichParams::regular_spiking()))
//!     .initial_potential(-65.0)
//!     .num_workers(8)
//!     .input(input)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(network.num_layers(), 3);
//! assert_eq!(network.num_timesteps(), 10);
//! ```
//!
//! ## From a File
//!
//! See [`config::NetworkConfig`].
//!
//! # Simulating Networks
//!
//! ```rust
//! use cluster_snn::core::input::InputStream;
//! use cluster_snn::core::network::NetworkBuilder;
//! use cluster_snn::core::neuron::{LifParams, NeuronModel};
//! use cluster_snn::core::record::Recorder;
//! use cluster_snn::core::weights::WorkerOffset;
//!
//! let mut network = NetworkBuilder::new(4)
//!     .layer(10, WorkerOffset::default())
//!     .model(NeuronModel::Lif(LifParams::reference()))
//!     .initial_potential(-65.0)
//!     .input(InputStream::from_rows(&[vec![1, 1, 0, 0], vec![0, 1, 1, 0]]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let mut recorder = Recorder::new();
//! network.run(&mut recorder).unwrap();
//! assert_eq!(recorder.record().num_timesteps(), 2);
//! ```

pub mod config;
pub mod core;
pub mod error;

/// The number of workers of the reference cluster.
pub const DEFAULT_NUM_WORKERS: usize = 8;
/// The potential at which an Izhikevich neuron fires.
pub const IZHIKEVICH_PEAK: f64 = 30.0;
