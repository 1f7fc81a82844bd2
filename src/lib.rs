//! Helpers to visualize clustering results on 2D data.
//!
//! # Crate Layout
//!
//! Plotting routines draw on a [`Surface`], which is passed explicitly.
//! [`Figure`] records shapes in memory and renders them as SVG, and other
//! backends can implement the trait.
//!
//! Clustering algorithms implement the [`Partition`] trait, the same way they
//! would outside of any plotting context.
//!
//! # Available routines
//!
//! - [`draw_ellipse`]: 1σ, 2σ and 3σ ellipses of a 2D Gaussian
//! - [`plot_kmeans`]: clusters points with [K-means][KMeans], then draws
//!   points, centers, and a circle around each cluster
//! - [`plot_gmm`]: draws points labeled by a
//!   [Gaussian mixture][mixture::GaussianMixture] along with its ellipses
//!
//! # Example
//!
//! ```rust
//! use grappe::{Figure, Point2D};
//!
//! let points: Vec<Point2D> = (0..10)
//!     .map(|i| Point2D::new(i as f64, (i % 3) as f64) + Point2D::from_element(20.0 * (i / 5) as f64))
//!     .collect();
//!
//! let mut figure = Figure::new();
//! let plot = grappe::plot_kmeans(&mut figure, &points, 2).unwrap();
//! assert_eq!(plot.clusters.len(), 2);
//!
//! let mut svg = Vec::new();
//! figure.write_svg(&mut svg).unwrap();
//! ```

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod algorithms;
pub mod geometry;
pub mod mixture;
pub mod palette;
mod plot;
mod surface;
mod svg;

pub use crate::algorithms::*;
pub use crate::geometry::BoundingBox;
pub use crate::geometry::Covariance;
pub use crate::geometry::Ellipse;
pub use crate::geometry::Point2D;
pub use crate::mixture::MAX_ALPHA;
pub use crate::plot::*;
pub use crate::surface::Figure;
pub use crate::surface::Shape;
pub use crate::surface::Style;
pub use crate::surface::Surface;

pub use nalgebra;

use std::cmp::Ordering;

/// The `Partition` trait allows for partitioning data.
///
/// Clustering algorithms implement this trait.
///
/// The generic argument `M` defines the input of the algorithms (e.g. a set of
/// 2D points).
///
/// The input partition must be of the correct size and its contents may or may
/// not be used by the algorithms.
pub trait Partition<M> {
    /// Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    /// Error details, should the algorithm fail to run.
    type Error;

    /// Partition the given data and output the part ID of each element in
    /// `part_ids`.
    ///
    /// Part IDs must be contiguous and start from zero, meaning the number of
    /// parts is one plus the maximum of `part_ids`.  If a lower ID does not
    /// appear in the array, the part is assumed to be empty.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
    -> Result<Self::Metadata, Self::Error>;
}

fn partial_cmp<W>(a: &W, b: &W) -> Ordering
where
    W: PartialOrd,
{
    if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
