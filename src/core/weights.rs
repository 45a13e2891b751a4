//! Synaptic weights of a layer and the seeders used to populate them.
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// Dense row-major weight matrix of a layer, with one row per neuron and one column per input line.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WeightMatrix {
    num_rows: usize,
    num_cols: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    /// Create a matrix of zeros with the specified shape.
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        WeightMatrix {
            num_rows,
            num_cols,
            data: vec![0.0; num_rows * num_cols],
        }
    }

    /// Create a matrix from its rows.
    /// Returns an error if the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SNNError> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |row| row.len());
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != num_cols) {
            return Err(SNNError::IncompatibleTopology(format!(
                "Weight row {} has {} columns, expected {}",
                i,
                row.len(),
                num_cols
            )));
        }
        Ok(WeightMatrix {
            num_rows,
            num_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Returns the number of rows, i.e., the number of neurons.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns, i.e., the number of input lines.
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the weight from input `col` to neuron `row`, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.num_rows && col < self.num_cols {
            Some(self.data[row * self.num_cols + col])
        } else {
            None
        }
    }

    /// Returns the weights of neuron `row`, if any.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.num_rows {
            Some(&self.data[row * self.num_cols..(row + 1) * self.num_cols])
        } else {
            None
        }
    }

    /// An iterator over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.num_cols.max(1)).take(self.num_rows)
    }

    /// A mutable iterator over the rows of the matrix.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> + '_ {
        let num_rows = self.num_rows;
        self.data.chunks_exact_mut(self.num_cols.max(1)).take(num_rows)
    }

    /// Returns the matrix as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

/// A source of synaptic weights, queried once per neuron during weight initialization.
///
/// The worker owning neuron `neuron` fills the whole `row` of that neuron.
pub trait WeightSeeder: Send + Sync {
    /// Fill the weights of neuron `neuron`, on behalf of worker `worker`.
    fn seed_row(&self, worker: usize, neuron: usize, row: &mut [f64]);

    /// Check that the seeder can populate a matrix of the given shape.
    fn check_shape(&self, _num_rows: usize, _num_cols: usize) -> Result<(), SNNError> {
        Ok(())
    }
}

/// Every weight of a row is the identifier of the owning worker plus a constant offset.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct WorkerOffset {
    pub offset: f64,
}

impl Default for WorkerOffset {
    fn default() -> Self {
        WorkerOffset { offset: 3.0 }
    }
}

impl WeightSeeder for WorkerOffset {
    fn seed_row(&self, worker: usize, _neuron: usize, row: &mut [f64]) {
        row.fill(worker as f64 + self.offset);
    }
}

/// Integer weights drawn uniformly in `[low, high]`.
///
/// Every row draws from its own stream of the generator keyed by the seed, the stream being the neuron index.
/// The weights do not depend on the number of workers.
#[derive(Debug, Clone)]
pub struct RandomInt {
    dist: Uniform<i64>,
    seed: u64,
}

impl RandomInt {
    /// Create a new seeder of integer weights in `[low, high]`.
    /// Returns an error if the bounds are not ordered.
    pub fn build(low: i64, high: i64, seed: u64) -> Result<Self, SNNError> {
        if low > high {
            return Err(SNNError::InvalidParameters(format!(
                "Invalid weight bounds: {} is larger than {}",
                low, high
            )));
        }
        Ok(RandomInt {
            dist: Uniform::new_inclusive(low, high),
            seed,
        })
    }
}

impl WeightSeeder for RandomInt {
    fn seed_row(&self, _worker: usize, neuron: usize, row: &mut [f64]) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(neuron as u64);
        row.iter_mut()
            .for_each(|w| *w = self.dist.sample(&mut rng) as f64);
    }
}

/// Weights provided explicitly, row by row.
#[derive(Debug, PartialEq, Clone)]
pub struct Explicit {
    weights: WeightMatrix,
}

impl Explicit {
    pub fn new(weights: WeightMatrix) -> Self {
        Explicit { weights }
    }

    /// Create the seeder from the rows of the matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SNNError> {
        Ok(Explicit::new(WeightMatrix::from_rows(rows)?))
    }
}

impl WeightSeeder for Explicit {
    fn seed_row(&self, _worker: usize, neuron: usize, row: &mut [f64]) {
        if let Some(weights) = self.weights.row(neuron) {
            row.copy_from_slice(weights);
        }
    }

    fn check_shape(&self, num_rows: usize, num_cols: usize) -> Result<(), SNNError> {
        if self.weights.num_rows() != num_rows || self.weights.num_cols() != num_cols {
            return Err(SNNError::IncompatibleTopology(format!(
                "Weight matrix is {}x{}, expected {}x{}",
                self.weights.num_rows(),
                self.weights.num_cols(),
                num_rows,
                num_cols
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let weights = WeightMatrix::from_rows(vec![vec![3.0, 2.0, 4.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(weights.num_rows(), 2);
        assert_eq!(weights.num_cols(), 3);
        assert_eq!(weights.get(1, 2), Some(6.0));
        assert_eq!(weights.get(2, 0), None);
        assert_eq!(weights.get(0, 3), None);
        assert_eq!(weights.row(0), Some(&[3.0, 2.0, 4.0][..]));
        assert_eq!(weights.row(2), None);
        assert_eq!(weights.rows().count(), 2);

        assert!(matches!(
            WeightMatrix::from_rows(vec![vec![3.0, 2.0], vec![4.0]]),
            Err(SNNError::IncompatibleTopology(_))
        ));
    }

    #[test]
    fn test_rows_mut() {
        let mut weights = WeightMatrix::zeros(3, 2);
        for (i, row) in weights.rows_mut().enumerate() {
            row.fill(i as f64);
        }
        assert_eq!(
            weights.to_rows(),
            vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]]
        );
    }

    #[test]
    fn test_worker_offset() {
        let mut row = [0.0; 4];
        WorkerOffset::default().seed_row(5, 13, &mut row);
        assert_eq!(row, [8.0; 4]);
    }

    #[test]
    fn test_random_int() {
        assert!(matches!(
            RandomInt::build(5, -5, 0),
            Err(SNNError::InvalidParameters(_))
        ));

        let seeder = RandomInt::build(-5, 5, 42).unwrap();
        let mut row = [f64::NAN; 64];
        seeder.seed_row(0, 3, &mut row);
        assert!(row
            .iter()
            .all(|w| w.fract() == 0.0 && (-5.0..=5.0).contains(w)));

        // The weights only depend on the neuron, not on the worker
        let mut other = [f64::NAN; 64];
        seeder.seed_row(7, 3, &mut other);
        assert_eq!(row, other);

        seeder.seed_row(0, 4, &mut other);
        assert_ne!(row, other);
    }

    #[test]
    fn test_random_int_adjacent_seeds() {
        let first = RandomInt::build(-5, 10, 1).unwrap();
        let second = RandomInt::build(-5, 10, 2).unwrap();
        for neuron in 0..16 {
            let mut row = [0.0; 16];
            first.seed_row(0, neuron + 1, &mut row);
            for other_neuron in 0..16 {
                let mut other = [0.0; 16];
                second.seed_row(0, other_neuron, &mut other);
                assert_ne!(row, other);
            }
        }
    }

    #[test]
    fn test_explicit() {
        let seeder = Explicit::from_rows(vec![vec![3.0, 2.0], vec![4.0, 5.0]]).unwrap();
        assert!(seeder.check_shape(2, 2).is_ok());
        assert!(matches!(
            seeder.check_shape(2, 3),
            Err(SNNError::IncompatibleTopology(_))
        ));
        let mut row = [0.0; 2];
        seeder.seed_row(1, 1, &mut row);
        assert_eq!(row, [4.0, 5.0]);
    }
}
