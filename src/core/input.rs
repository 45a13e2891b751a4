//! External input of a network: one row of binary activations per timestep.
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// The activations of the primary input lines, for every timestep.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InputStream {
    num_lines: usize,
    rows: Vec<Vec<bool>>,
}

impl InputStream {
    /// Create an input stream from its activations, one row per timestep.
    /// Returns an error if the rows do not all have the same width.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self, SNNError> {
        let num_lines = rows.first().map_or(0, |row| row.len());
        if let Some((t, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != num_lines) {
            return Err(SNNError::IncompatibleTopology(format!(
                "Input row of timestep {} has {} lines, expected {}",
                t,
                row.len(),
                num_lines
            )));
        }
        Ok(InputStream { num_lines, rows })
    }

    /// Create an input stream from binary values, one row per timestep.
    /// Returns an error if a value is neither 0 nor 1.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, SNNError> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|&v| to_activation(v)).collect())
            .collect::<Result<Vec<Vec<bool>>, SNNError>>()?;
        InputStream::new(rows)
    }

    /// Create an input stream from binary values, one row per input line and one column per timestep.
    pub fn from_lines(lines: &[Vec<u8>]) -> Result<Self, SNNError> {
        let num_timesteps = lines.first().map_or(0, |line| line.len());
        if let Some((l, line)) = lines.iter().enumerate().find(|(_, line)| line.len() != num_timesteps) {
            return Err(SNNError::IncompatibleTopology(format!(
                "Input line {} has {} timesteps, expected {}",
                l,
                line.len(),
                num_timesteps
            )));
        }
        let rows = (0..num_timesteps)
            .map(|t| lines.iter().map(|line| to_activation(line[t])).collect())
            .collect::<Result<Vec<Vec<bool>>, SNNError>>()?;
        InputStream::new(rows)
    }

    /// Sample an input stream where every line is active independently with the given probability at every timestep.
    pub fn rand<R: Rng>(
        num_lines: usize,
        num_timesteps: usize,
        rate: f64,
        rng: &mut R,
    ) -> Result<Self, SNNError> {
        let dist = Bernoulli::new(rate).map_err(|e| {
            SNNError::InvalidParameters(format!("Invalid activation rate {}: {}", rate, e))
        })?;
        let rows = (0..num_timesteps)
            .map(|_| (0..num_lines).map(|_| dist.sample(rng)).collect())
            .collect();
        Ok(InputStream { num_lines, rows })
    }

    /// Returns the number of input lines.
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Returns the number of timesteps.
    pub fn num_timesteps(&self) -> usize {
        self.rows.len()
    }

    /// Returns the activations at a given timestep, if any.
    pub fn row(&self, timestep: usize) -> Option<&[bool]> {
        self.rows.get(timestep).map(|row| row.as_slice())
    }
}

fn to_activation(value: u8) -> Result<bool, SNNError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        v => Err(SNNError::InvalidParameters(format!(
            "Input activations must be 0 or 1, got {}",
            v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SEED: u64 = 42;

    #[test]
    fn test_from_rows() {
        let input = InputStream::from_rows(&[vec![1, 0, 0, 1], vec![0, 0, 0, 1]]).unwrap();
        assert_eq!(input.num_lines(), 4);
        assert_eq!(input.num_timesteps(), 2);
        assert_eq!(input.row(0), Some(&[true, false, false, true][..]));
        assert_eq!(input.row(1), Some(&[false, false, false, true][..]));
        assert_eq!(input.row(2), None);

        assert!(matches!(
            InputStream::from_rows(&[vec![1, 2]]),
            Err(SNNError::InvalidParameters(_))
        ));
        assert!(matches!(
            InputStream::from_rows(&[vec![1, 0], vec![1]]),
            Err(SNNError::IncompatibleTopology(_))
        ));
    }

    #[test]
    fn test_from_lines() {
        let by_lines =
            InputStream::from_lines(&[vec![1, 0], vec![0, 0], vec![0, 0], vec![1, 1]]).unwrap();
        let by_rows = InputStream::from_rows(&[vec![1, 0, 0, 1], vec![0, 0, 0, 1]]).unwrap();
        assert_eq!(by_lines, by_rows);

        assert!(matches!(
            InputStream::from_lines(&[vec![1, 0], vec![0]]),
            Err(SNNError::IncompatibleTopology(_))
        ));
    }

    #[test]
    fn test_rand() {
        let mut rng = StdRng::seed_from_u64(SEED);
        assert!(matches!(
            InputStream::rand(4, 10, 1.5, &mut rng),
            Err(SNNError::InvalidParameters(_))
        ));

        let input = InputStream::rand(16, 100, 0.0, &mut rng).unwrap();
        assert_eq!(input.num_lines(), 16);
        assert_eq!(input.num_timesteps(), 100);
        assert!((0..100).all(|t| input.row(t).unwrap().iter().all(|&a| !a)));

        let input = InputStream::rand(16, 100, 1.0, &mut rng).unwrap();
        assert!((0..100).all(|t| input.row(t).unwrap().iter().all(|&a| a)));

        let input = InputStream::rand(16, 100, 0.5, &mut StdRng::seed_from_u64(SEED)).unwrap();
        let other = InputStream::rand(16, 100, 0.5, &mut StdRng::seed_from_u64(SEED)).unwrap();
        assert_eq!(input, other);
    }
}
