//! Grid search over Holt-Winters smoothing parameters.
//!
//! Every candidate triple is fitted on the series minus a short holdout and
//! scored by the MAE of its holdout forecast. The search space is an explicit
//! candidate list, so candidates can be scored independently (in parallel
//! with the `parallel` feature) and the winner picked in grid order.

use crate::core::ModelParameters;
use crate::error::{ForecastError, Result};
use crate::models::{fit_and_forecast, FittedModel};
use crate::utils::metrics::mae;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Largest holdout scored per candidate.
const MAX_HOLDOUT: usize = 3;

/// Candidate values for each smoothing weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
}

impl Default for ParameterGrid {
    /// Nine alphas in `0.1..=0.9`, seven betas and gammas in `0.1..=0.5`.
    fn default() -> Self {
        let shallow = vec![0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5];
        Self {
            alpha: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9],
            beta: shallow.clone(),
            gamma: shallow,
        }
    }
}

impl ParameterGrid {
    /// Number of candidate triples.
    pub fn len(&self) -> usize {
        self.alpha.len() * self.beta.len() * self.gamma.len()
    }

    /// Whether the grid has no candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every axis is non-empty and every value is a valid weight.
    pub fn validate(&self) -> Result<()> {
        self.candidates().map(|_| ())
    }

    /// The full cross product in iteration order: alpha outermost, gamma
    /// innermost.
    pub fn candidates(&self) -> Result<Vec<ModelParameters>> {
        if self.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "parameter grid has an empty axis".to_string(),
            ));
        }

        let mut out = Vec::with_capacity(self.len());
        for &alpha in &self.alpha {
            for &beta in &self.beta {
                for &gamma in &self.gamma {
                    out.push(ModelParameters::new(alpha, beta, gamma)?);
                }
            }
        }
        Ok(out)
    }
}

/// Winner of a parameter search and its full-series fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Selected parameters, [`ModelParameters::FALLBACK`] when exhausted.
    pub parameters: ModelParameters,
    /// Model fitted on the whole series with the selected parameters.
    pub model: FittedModel,
    /// Holdout MAE of the winner, `None` when no candidate could be scored.
    pub holdout_mae: Option<f64>,
    /// Candidates scored.
    pub evaluated: usize,
    /// Candidates skipped because their fit failed.
    pub skipped: usize,
}

impl SearchOutcome {
    /// True when every candidate failed and the fallback triple was used.
    pub fn exhausted(&self) -> bool {
        self.holdout_mae.is_none()
    }
}

/// Number of trailing points held out when scoring a series of length `n`.
pub fn holdout_len(n: usize) -> usize {
    MAX_HOLDOUT.min(n / 5)
}

/// Search the default grid.
///
/// # Example
/// ```
/// use demand_forecast::utils::optimization::search_best_parameters;
///
/// let series: Vec<f64> = (0..48)
///     .map(|i| 100.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
///     .collect();
///
/// let outcome = search_best_parameters(&series, 12, 1).unwrap();
/// assert!(outcome.holdout_mae.unwrap() < 0.01);
/// assert_eq!(outcome.model.forecast.len(), 1);
/// ```
pub fn search_best_parameters(
    series: &[f64],
    season_length: usize,
    horizon: usize,
) -> Result<SearchOutcome> {
    search_with_grid(series, season_length, horizon, &ParameterGrid::default())
}

/// Search `grid` for the parameters with the lowest holdout MAE.
///
/// The holdout is the last `min(3, floor(0.2 n))` points. Candidates whose
/// fit fails on the training part are skipped; ties go to the earliest
/// candidate in grid order. When no candidate can be scored the fallback
/// triple is fitted on the full series.
///
/// # Errors
/// An invalid grid, or a final full-series fit that fails (for example a
/// series shorter than two seasons).
pub fn search_with_grid(
    series: &[f64],
    season_length: usize,
    horizon: usize,
    grid: &ParameterGrid,
) -> Result<SearchOutcome> {
    let candidates = grid.candidates()?;
    let scores = score_candidates(series, season_length, &candidates);

    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.iter().enumerate() {
        if let Some(score) = *score {
            if best.map_or(true, |(_, b)| score < b) {
                best = Some((i, score));
            }
        }
    }

    let evaluated = scores.iter().filter(|s| s.is_some()).count();
    let skipped = candidates.len() - evaluated;

    let (parameters, holdout_mae) = match best {
        Some((i, score)) => {
            debug!(
                alpha = candidates[i].alpha(),
                beta = candidates[i].beta(),
                gamma = candidates[i].gamma(),
                holdout_mae = score,
                evaluated,
                skipped,
                "parameter search selected candidate"
            );
            (candidates[i], Some(score))
        }
        None => {
            warn!(
                candidates = candidates.len(),
                len = series.len(),
                "every parameter candidate failed, using fallback"
            );
            (ModelParameters::FALLBACK, None)
        }
    };

    let model = fit_and_forecast(series, season_length, horizon, parameters)?;

    Ok(SearchOutcome {
        parameters,
        model,
        holdout_mae,
        evaluated,
        skipped,
    })
}

/// Holdout MAE per candidate, in candidate order; `None` for a failed fit.
fn score_candidates(
    series: &[f64],
    season_length: usize,
    candidates: &[ModelParameters],
) -> Vec<Option<f64>> {
    let n = series.len();
    let holdout = holdout_len(n);
    if holdout == 0 {
        return vec![None; candidates.len()];
    }
    let (train, test) = series.split_at(n - holdout);

    let score = |params: &ModelParameters| -> Option<f64> {
        let model = fit_and_forecast(train, season_length, holdout, *params).ok()?;
        let error = mae(test, &model.forecast);
        error.is_finite().then_some(error)
    };

    #[cfg(feature = "parallel")]
    let scores: Vec<Option<f64>> = candidates.par_iter().map(score).collect();
    #[cfg(not(feature = "parallel"))]
    let scores: Vec<Option<f64>> = candidates.iter().map(score).collect();

    scores
}
