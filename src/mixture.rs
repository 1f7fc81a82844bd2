//! Gaussian mixture models.
//!
//! Models are built from already-estimated parameters; this module only
//! checks and evaluates them.

use crate::geometry::Covariance;
use crate::geometry::Point2D;
use crate::Error;
use nalgebra::Matrix2;
use rayon::iter::IntoParallelRefIterator as _;
use rayon::iter::ParallelIterator as _;
use std::f64::consts::PI;

/// Maximum distance between one and the sum of mixture weights.
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Opacity of the ellipses of the heaviest components.
pub const MAX_ALPHA: f64 = 0.3;

/// Added to the diagonal of singular covariances before inverting them.
const RIDGE: f64 = 1e-6;

/// One Gaussian of a mixture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    pub mean: Point2D,
    pub covariance: Covariance,
    pub weight: f64,
}

/// Pre-computed terms of a component's log-density.
#[derive(Clone, Copy, Debug)]
struct LogDensity {
    mean: Point2D,
    precision: Matrix2<f64>,
    /// `log(weight) - log(2π) - log(det(covariance)) / 2`
    offset: f64,
}

impl LogDensity {
    fn new(component: &Component) -> LogDensity {
        let mut covariance = component.covariance.to_matrix();
        let scale = covariance.amax();
        // The ridge makes singular PSD matrices invertible. Thresholds are
        // relative to the largest entry.
        if scale == 0.0 {
            covariance = Matrix2::from_diagonal_element(RIDGE);
        } else if covariance.determinant() <= f64::EPSILON * scale * scale {
            covariance += Matrix2::from_diagonal_element(RIDGE * scale);
        }
        let precision = covariance
            .try_inverse()
            .unwrap_or_else(|| Matrix2::from_diagonal_element(f64::INFINITY));
        let log_det = covariance.determinant().ln();
        LogDensity {
            mean: component.mean,
            precision,
            offset: component.weight.ln() - f64::ln(2.0 * PI) - 0.5 * log_det,
        }
    }

    /// `log(weight * N(point | mean, covariance))`
    fn eval(&self, point: &Point2D) -> f64 {
        let d = point - self.mean;
        self.offset - 0.5 * d.dot(&(self.precision * d))
    }
}

/// A mixture of 2D Gaussians.
///
/// # Example
///
/// ```rust
/// use grappe::mixture::{Component, GaussianMixture};
/// use grappe::{Covariance, Point2D};
///
/// let gmm = GaussianMixture::new(vec![
///     Component {
///         mean: Point2D::new(0.0, 0.0),
///         covariance: Covariance::Spherical(1.0),
///         weight: 0.25,
///     },
///     Component {
///         mean: Point2D::new(10.0, 0.0),
///         covariance: Covariance::Spherical(1.0),
///         weight: 0.75,
///     },
/// ])
/// .unwrap();
///
/// let labels = gmm.predict(&[Point2D::new(1.0, 0.5), Point2D::new(9.0, -0.5)]);
/// assert_eq!(labels, [0, 1]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianMixture {
    components: Vec<Component>,
}

impl GaussianMixture {
    /// Builds a mixture after checking its parameters.
    ///
    /// Weights must be non-negative and sum to one. Means must be finite and
    /// covariances symmetric positive semi-definite.
    pub fn new(components: Vec<Component>) -> Result<GaussianMixture, Error> {
        if components.is_empty() {
            return Err(Error::EmptyModel);
        }
        if components
            .iter()
            .any(|c| !c.weight.is_finite() || c.weight < 0.0)
        {
            return Err(Error::InvalidWeights);
        }
        let total_weight: f64 = components.iter().map(|c| c.weight).sum();
        if WEIGHT_TOLERANCE < (total_weight - 1.0).abs() {
            return Err(Error::InvalidWeights);
        }
        if components
            .iter()
            .any(|c| c.mean.iter().any(|e| !e.is_finite()))
        {
            return Err(Error::NonFinite);
        }
        if let Some(component) = components.iter().position(|c| !c.covariance.is_valid()) {
            return Err(Error::InvalidCovariance { component });
        }
        Ok(GaussianMixture { components })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components, which is never zero.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.components.iter().map(|c| c.weight)
    }

    pub fn max_weight(&self) -> f64 {
        self.weights().fold(0.0, f64::max)
    }

    /// Returns each weight divided by the largest one.
    ///
    /// The heaviest components get exactly `1.0`.
    pub fn relative_weights(&self) -> Vec<f64> {
        let max_weight = self.max_weight();
        self.weights()
            .map(|w| if max_weight > 0.0 { w / max_weight } else { 0.0 })
            .collect()
    }

    /// Returns the opacity of each component's ellipses, proportional to its
    /// weight and equal to [`MAX_ALPHA`] for the heaviest ones.
    pub fn opacity_factors(&self) -> Vec<f64> {
        self.relative_weights()
            .into_iter()
            .map(|w| MAX_ALPHA * w)
            .collect()
    }

    fn log_densities(&self) -> Vec<LogDensity> {
        self.components.iter().map(LogDensity::new).collect()
    }

    /// Returns the most likely component of each point.
    ///
    /// Ties go to the component with the lowest ID.
    pub fn predict(&self, points: &[Point2D]) -> Vec<usize> {
        let densities = self.log_densities();
        points
            .par_iter()
            .map(|p| {
                densities
                    .iter()
                    .map(|d| d.eval(p))
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (idx, value)| {
                        if value > best.1 {
                            (idx, value)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }

    /// Returns, for each point, the probability that it was drawn from each
    /// component.
    pub fn predict_proba(&self, points: &[Point2D]) -> Vec<Vec<f64>> {
        let densities = self.log_densities();
        points
            .par_iter()
            .map(|p| {
                let values: Vec<f64> = densities.iter().map(|d| d.eval(p)).collect();
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                if !max.is_finite() {
                    return vec![1.0 / values.len() as f64; values.len()];
                }
                let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
                let total: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / total).collect()
            })
            .collect()
    }
}
