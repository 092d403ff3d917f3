//! Standard (z-score) feature scaling

use crate::error::{PumpGuardError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature fitted parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    /// Population variance (ddof = 0)
    pub var: f64,
    /// `sqrt(var)`, or 1.0 for constant features
    pub scale: f64,
}

/// Standard scaler: `(x - mean) / scale`, one set of parameters per column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    n_samples_seen: usize,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.params.len()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    /// Fit mean and variance of every column
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples == 0 || x.ncols() == 0 {
            return Err(PumpGuardError::DataError("cannot fit scaler on empty data".to_string()));
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|column| Self::compute_params(column))
            .collect();
        self.n_samples_seen = n_samples;
        Ok(self)
    }

    fn compute_params(column: ArrayView1<f64>) -> ScalerParams {
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        ScalerParams {
            mean,
            var,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }

    /// Scale with the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PumpGuardError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(PumpGuardError::ShapeError {
                expected: format!("{} features", self.params.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| (v - params.mean) / params.scale);
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PumpGuardError::ModelNotFitted);
        }
        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| v * params.scale + params.mean);
        }
        Ok(out)
    }
}
