//! Penalized (ridge-style) least squares
//!
//! Minimizes `Σ (y_i - x_i·θ)² + Σ λ_j θ_j²` with one penalty per
//! coefficient. Gaussian priors on coefficients turn a MAP fit into exactly
//! this problem, and a reweighted quadratic penalty approximates a Laplace
//! prior. The normal equations are solved with a Cholesky factorization.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Least squares solver with a diagonal quadratic penalty
#[derive(Debug, Clone)]
pub struct PenalizedLeastSquares {
    penalties: Vec<f64>,
}

impl PenalizedLeastSquares {
    /// Create a solver with one non-negative penalty per coefficient
    pub fn new(penalties: Vec<f64>) -> Result<Self> {
        if penalties.is_empty() {
            return Err(MathError::InvalidInput(
                "At least one coefficient is required".to_string(),
            ));
        }
        if let Some(bad) = penalties.iter().find(|p| !(**p >= 0.0) || !p.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Penalties must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(Self { penalties })
    }

    /// Number of coefficients
    pub fn width(&self) -> usize {
        self.penalties.len()
    }

    /// Replace the penalty on coefficient `index`
    pub fn set_penalty(&mut self, index: usize, penalty: f64) -> Result<()> {
        if !(penalty >= 0.0) || !penalty.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Penalty must be finite and non-negative, got {}",
                penalty
            )));
        }
        match self.penalties.get_mut(index) {
            Some(slot) => {
                *slot = penalty;
                Ok(())
            }
            None => Err(MathError::InvalidInput(format!(
                "Coefficient index {} out of range for {} coefficients",
                index,
                self.penalties.len()
            ))),
        }
    }

    /// Solve for the coefficients given design rows and targets
    pub fn solve(&self, design: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
        let p = self.width();
        if design.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Design has {} rows but {} targets were given",
                design.len(),
                targets.len()
            )));
        }
        if design.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a regression on zero rows".to_string(),
            ));
        }
        if let Some(row) = design.iter().find(|row| row.len() != p) {
            return Err(MathError::InvalidInput(format!(
                "Design row has {} columns, expected {}",
                row.len(),
                p
            )));
        }

        let mut gram = DMatrix::<f64>::zeros(p, p);
        let mut rhs = DVector::<f64>::zeros(p);
        for (row, &y) in design.iter().zip(targets) {
            for i in 0..p {
                let xi = row[i];
                if xi == 0.0 {
                    continue;
                }
                rhs[i] += xi * y;
                for j in i..p {
                    gram[(i, j)] += xi * row[j];
                }
            }
        }
        for i in 0..p {
            gram[(i, i)] += self.penalties[i];
            for j in 0..i {
                gram[(i, j)] = gram[(j, i)];
            }
        }

        let cholesky = gram.cholesky().ok_or_else(|| {
            MathError::CalculationError(
                "Normal equations are not positive definite".to_string(),
            )
        })?;
        let solution = cholesky.solve(&rhs);

        if solution.iter().any(|v| !v.is_finite()) {
            return Err(MathError::CalculationError(
                "Least squares solution is not finite".to_string(),
            ));
        }
        Ok(solution.iter().copied().collect())
    }
}

/// Dot product of a design row with coefficients
pub fn predict_row(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(x, b)| x * b).sum()
}
