//! Division of attention over channels as the steady state of a Markov chain.

use crate::{Error, Result};
use nalgebra::DMatrix;

/// Convergence tolerance of the eigen-decomposition.
const EPS: f64 = f64::EPSILON;

/// Maximum number of iterations of the eigen-decomposition.
const MAX_ITER: usize = 10_000;

/// The steady-state division of attention over a fixed set of channels.
///
/// Glances move between channels as a Markov chain in which the probability of
/// staying on a channel equals its task demand, and the probability of switching
/// is shared among the other channels in proportion to their demand. The fraction
/// of time spent on each channel is the stationary distribution of this chain.
/// Everything is computed on construction.
#[derive(Clone, Debug, Default)]
pub struct AttentionMatrix {
    demand: Vec<f64>,
    attention: Vec<f64>,
    anticipation_reliance: Vec<f64>,
}

impl AttentionMatrix {
    /// Computes the attention for the given channel demands.
    ///
    /// Each demand must be in `[0, 1)`.
    pub fn new(demand: &[f64]) -> Result<Self> {
        if let Some((index, &value)) = demand
            .iter()
            .enumerate()
            .find(|(_, d)| !(0.0..1.0).contains(*d))
        {
            return Err(Error::InvalidDemand { index, value });
        }

        let n = demand.len();
        let mut matrix = Self {
            demand: demand.to_vec(),
            attention: vec![0.0; n],
            anticipation_reliance: vec![0.0; n],
        };

        let demand_sum: f64 = demand.iter().sum();
        if demand_sum == 0.0 {
            return Ok(matrix);
        }
        if demand_sum <= 1.0 {
            matrix.attention.copy_from_slice(demand);
            return Ok(matrix);
        }

        let transitions = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                demand[i]
            } else if demand_sum > demand[i] {
                (1.0 - demand[i]) * demand[j] / (demand_sum - demand[i])
            } else {
                0.0
            }
        });
        matrix.attention = stationary_distribution(transitions)?;
        for i in 0..n {
            matrix.anticipation_reliance[i] = demand[i] - matrix.attention[i];
        }

        Ok(matrix)
    }

    /// The number of channels.
    pub fn len(&self) -> usize {
        self.demand.len()
    }

    /// Whether there are no channels.
    pub fn is_empty(&self) -> bool {
        self.demand.is_empty()
    }

    /// The task demand of channel `i`.
    pub fn demand(&self, i: usize) -> f64 {
        self.demand[i]
    }

    /// The fraction of time spent on channel `i`.
    pub fn attention(&self, i: usize) -> f64 {
        self.attention[i]
    }

    /// The demand of channel `i` that is not met by attention.
    pub fn anticipation_reliance(&self, i: usize) -> f64 {
        self.anticipation_reliance[i]
    }

    /// The anticipation reliance of channel `i` relative to its demand,
    /// or `1.0` for a channel without demand.
    pub fn deterioration(&self, i: usize) -> f64 {
        if self.demand[i] == 0.0 {
            1.0
        } else {
            self.anticipation_reliance[i] / self.demand[i]
        }
    }

    /// The demand of all channels.
    pub fn demands(&self) -> &[f64] {
        &self.demand
    }

    /// The attention of all channels.
    pub fn attentions(&self) -> &[f64] {
        &self.attention
    }

    /// The anticipation reliance of all channels.
    pub fn anticipation_reliances(&self) -> &[f64] {
        &self.anticipation_reliance
    }
}

/// Finds the left eigenvector of a row-stochastic matrix for the eigenvalue
/// closest to 1, normalised to sum to 1.
fn stationary_distribution(transitions: DMatrix<f64>) -> Result<Vec<f64>> {
    let n = transitions.nrows();
    let transposed = transitions.transpose();

    let eigenvalue = transposed
        .clone()
        .try_schur(EPS, MAX_ITER)
        .ok_or_else(non_convergence)?
        .complex_eigenvalues()
        .iter()
        .map(|ev| ev.re)
        .min_by(|a, b| (a - 1.0).abs().total_cmp(&(b - 1.0).abs()))
        .ok_or_else(non_convergence)?;

    // The eigenvector spans the null space of (P^T - λI), which is the right
    // singular vector of the smallest singular value.
    let shifted = transposed - DMatrix::identity(n, n) * eigenvalue;
    let svd = shifted
        .try_svd(false, true, EPS, MAX_ITER)
        .ok_or_else(non_convergence)?;
    let v_t = svd.v_t.as_ref().ok_or_else(non_convergence)?;
    let k = svd.singular_values.imin();
    let vector = v_t.row(k);

    let sum = vector.sum();
    if !sum.is_normal() {
        return Err(non_convergence());
    }
    Ok(vector.iter().map(|x| x / sum).collect())
}

fn non_convergence() -> Error {
    log::warn!("Attention matrix eigen-decomposition failed to converge");
    Error::NonConvergence
}
