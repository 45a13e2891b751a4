//! Core module defining the main components of the cluster SNN library.
//!
//! This module provides the building blocks for simulating layered spiking neural networks on a fixed pool of workers:
//!
//! - [`neuron`]: LIF and Izhikevich dynamics
//! - [`weights`]: dense weight matrices and weight seeders
//! - [`layer`]: fully-connected layers of neurons
//! - [`partition`]: round-robin partitioning of neurons onto workers
//! - [`scheduler`]: ordered, barrier-synchronized simulation phases
//! - [`network`]: feed-forward networks and the timestep loop
//! - [`input`]: external binary input streams
//! - [`record`]: observation of running simulations
//!
//! # Examples
//!
//! ```
//! use cluster_snn::core::input::InputStream;
//! use cluster_snn::core::network::NetworkBuilder;
//! use cluster_snn::core::neuron::{LifParams, NeuronModel};
//! use cluster_snn::core::weights::{Explicit, WorkerOffset};
//!
//! let weights = Explicit::from_rows(vec![
//!     vec![3.0, 2.0, 4.0, 1.0],
//!     vec![4.0, 5.0, 6.0, 4.0],
//!     vec![3.0, 10.0, 1.0, -5.0],
//!     vec![4.0, 1.0, 2.0, -4.0],
//! ])
//! .unwrap();
//!
//! let mut network = NetworkBuilder::new(4)
//!     .layer(4, weights)
//!     .layer(2, WorkerOffset::default())
//!     .model(NeuronModel::Lif(LifParams::build(6.0, 2.0, Some(10.0)).unwrap()))
//!     .input(InputStream::from_rows(&[vec![1, 0, 0, 1]]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! network.init().unwrap();
//! network.step().unwrap();
//!
//! // Only the second neuron of the first layer fires
//! assert_eq!(network.layers()[0].output(), &[false, true, false, false]);
//! ```
pub mod input;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod partition;
pub mod record;
pub mod scheduler;
pub mod weights;
