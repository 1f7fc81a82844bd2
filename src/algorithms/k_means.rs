//! Lloyd's k-means algorithm, seeded with k-means++.
//!
//! Reference: Arthur, D., Vassilvitskii, S. (2007). k-means++: the advantages
//! of careful seeding. *SODA'07*.

use super::Error;
use crate::geometry::Point2D;
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand::SeedableRng as _;
use rayon::iter::IndexedParallelIterator as _;
use rayon::iter::IntoParallelRefMutIterator as _;
use rayon::iter::ParallelIterator as _;

/// Returns the index of the nearest center and the squared distance to it.
fn nearest(point: &Point2D, centers: &[Point2D]) -> (usize, f64) {
    centers
        .iter()
        .map(|center| (point - center).norm_squared())
        .enumerate()
        .fold((0, f64::INFINITY), |best, (idx, d2)| {
            if d2 < best.1 {
                (idx, d2)
            } else {
                best
            }
        })
}

/// Picks `part_count` initial centers among the points.
///
/// The first center is drawn uniformly, the next ones with a probability
/// proportional to their squared distance to the nearest chosen center.
fn k_means_plus_plus<R>(rng: &mut R, points: &[Point2D], part_count: usize) -> Vec<Point2D>
where
    R: Rng,
{
    let mut centers = Vec::with_capacity(part_count);
    centers.push(points[rng.gen_range(0..points.len())]);

    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| (p - centers[0]).norm_squared())
        .collect();

    while centers.len() < part_count {
        // All weights are zero when the remaining points are duplicates of
        // chosen centers.
        let idx = match WeightedIndex::new(&distances) {
            Ok(dist) => rng.sample(dist),
            Err(_) => rng.gen_range(0..points.len()),
        };
        let center = points[idx];
        centers.push(center);
        for (d2, p) in distances.iter_mut().zip(points) {
            *d2 = f64::min(*d2, (p - center).norm_squared());
        }
    }

    centers
}

/// Assigns each point to its nearest center and returns the inertia.
fn assign(partition: &mut [usize], points: &[Point2D], centers: &[Point2D]) -> f64 {
    let distances: Vec<f64> = partition
        .par_iter_mut()
        .zip(points)
        .map(|(part, point)| {
            let (idx, d2) = nearest(point, centers);
            *part = idx;
            d2
        })
        .collect();
    // Summed in order, so that results do not depend on the thread count.
    distances.iter().sum()
}

/// Recomputes centers as the mean of their points.
///
/// Centers of empty parts are left where they are.
fn update_centers(partition: &[usize], points: &[Point2D], centers: &mut [Point2D]) {
    let mut sums = vec![Point2D::zeros(); centers.len()];
    let mut counts = vec![0_usize; centers.len()];
    for (part, point) in partition.iter().zip(points) {
        sums[*part] += point;
        counts[*part] += 1;
    }
    for (part, (center, (sum, count))) in centers
        .iter_mut()
        .zip(sums.into_iter().zip(counts))
        .enumerate()
    {
        if count == 0 {
            tracing::debug!(part, "empty part, center is kept");
            continue;
        }
        *center = sum / count as f64;
    }
}

/// Mean of the per-axis variances of the points.
fn mean_variance(points: &[Point2D]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().sum::<Point2D>() / n;
    let var = points
        .iter()
        .map(|p| (p - mean).component_mul(&(p - mean)))
        .sum::<Point2D>()
        / n;
    var.mean()
}

fn k_means(
    partition: &mut [usize],
    points: &[Point2D],
    settings: KMeans,
) -> Result<Metadata, Error> {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(settings.seed);
    let mut centers = k_means_plus_plus(&mut rng, points, settings.part_count);

    // Convergence is checked against the squared shift of all centers,
    // relative to the spread of the data.
    let threshold = settings.tolerance * mean_variance(points);
    let mut previous = centers.clone();
    let mut iterations = 0;

    while iterations < settings.max_iter {
        assign(partition, points, &centers);
        update_centers(partition, points, &mut centers);
        iterations += 1;

        let shift: f64 = centers
            .iter()
            .zip(&previous)
            .map(|(new, old)| (new - old).norm_squared())
            .sum();
        if shift <= threshold {
            break;
        }
        previous.copy_from_slice(&centers);
    }

    // Final assignment, so that labels match the returned centers.
    let inertia = assign(partition, points, &centers);
    tracing::info!(iterations, inertia, "k-means done");

    Ok(Metadata {
        centers,
        iterations,
        inertia,
    })
}

/// Diagnostic data for a [`KMeans`] run.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    /// Center of each part, in part ID order.
    pub centers: Vec<Point2D>,
    /// Number of Lloyd iterations that have been run.
    pub iterations: usize,
    /// Sum of squared distances of points to their center.
    pub inertia: f64,
}

/// # K-means
///
/// Splits points into `part_count` groups by iteratively assigning each point
/// to the nearest of `part_count` centers, and moving each center to the mean
/// of its points.
///
/// Initial centers are chosen with k-means++ from a random generator seeded
/// with `seed`, which makes runs deterministic.
///
/// # Example
///
/// ```rust
/// use grappe::Partition as _;
/// use grappe::Point2D;
///
/// let points = [
///     Point2D::new(0.0, 0.0),
///     Point2D::new(0.0, 1.0),
///     Point2D::new(10.0, 0.0),
///     Point2D::new(10.0, 1.0),
/// ];
/// let mut partition = [0; 4];
///
/// let metadata = grappe::KMeans { part_count: 2, ..Default::default() }
///     .partition(&mut partition, &points)
///     .unwrap();
///
/// assert_eq!(partition[0], partition[1]);
/// assert_eq!(partition[2], partition[3]);
/// assert_ne!(partition[0], partition[2]);
/// assert_eq!(metadata.centers.len(), 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct KMeans {
    pub part_count: usize,
    pub seed: u64,
    pub max_iter: usize,
    /// Relative tolerance on the movement of centers between two iterations.
    pub tolerance: f64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            part_count: 2,
            seed: 0,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

impl<P> crate::Partition<P> for KMeans
where
    P: AsRef<[Point2D]>,
{
    type Metadata = Metadata;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        points: P,
    ) -> Result<Self::Metadata, Self::Error> {
        let points = points.as_ref();
        if self.part_count == 0 {
            return Err(Error::NoParts);
        }
        if part_ids.len() != points.len() {
            return Err(Error::InputLenMismatch {
                expected: part_ids.len(),
                actual: points.len(),
            });
        }
        if points.len() < self.part_count {
            return Err(Error::NotEnoughPoints {
                parts: self.part_count,
                points: points.len(),
            });
        }
        if points.iter().flatten().any(|c| !c.is_finite()) {
            return Err(Error::NonFinite);
        }
        k_means(part_ids, points, *self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Partition as _;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn two_blobs() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.5, 0.5),
            Point2D::new(20.0, 20.0),
            Point2D::new(21.0, 20.0),
            Point2D::new(20.0, 21.0),
            Point2D::new(21.0, 21.0),
            Point2D::new(20.5, 20.5),
        ]
    }

    #[test]
    fn test_two_blobs() {
        let points = two_blobs();
        let mut partition = vec![0; points.len()];
        let metadata = KMeans::default()
            .partition(&mut partition, &points)
            .unwrap();

        assert!(partition[..5].iter().all(|p| *p == partition[0]));
        assert!(partition[5..].iter().all(|p| *p == partition[5]));
        assert_ne!(partition[0], partition[5]);

        let low = metadata.centers[partition[0]];
        let high = metadata.centers[partition[5]];
        assert_relative_eq!(low, Point2D::new(0.5, 0.5), epsilon = 1e-12);
        assert_relative_eq!(high, Point2D::new(20.5, 20.5), epsilon = 1e-12);
        assert_relative_eq!(metadata.inertia, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let points = two_blobs();
        let mut p1 = vec![0; points.len()];
        let mut p2 = vec![0; points.len()];
        let mut k_means = KMeans {
            part_count: 3,
            seed: 42,
            ..Default::default()
        };
        let m1 = k_means.partition(&mut p1, &points).unwrap();
        let m2 = k_means.partition(&mut p2, &points).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![Point2D::new(1.0, 1.0); 4];
        let mut partition = vec![0; 4];
        let metadata = KMeans {
            part_count: 3,
            ..Default::default()
        }
        .partition(&mut partition, &points)
        .unwrap();
        assert_eq!(metadata.inertia, 0.0);
        assert!(partition.iter().all(|p| *p < 3));
    }

    #[test]
    fn test_errors() {
        let points = two_blobs();
        let mut partition = vec![0; points.len()];

        let err = KMeans {
            part_count: 0,
            ..Default::default()
        }
        .partition(&mut partition, &points)
        .unwrap_err();
        assert_eq!(err, Error::NoParts);

        let err = KMeans {
            part_count: 11,
            ..Default::default()
        }
        .partition(&mut partition, &points)
        .unwrap_err();
        assert_eq!(
            err,
            Error::NotEnoughPoints {
                parts: 11,
                points: 10
            }
        );

        let err = KMeans::default()
            .partition(&mut partition[1..], &points)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InputLenMismatch {
                expected: 9,
                actual: 10
            }
        );

        let mut points = points;
        points[3].y = f64::NAN;
        let err = KMeans::default()
            .partition(&mut partition, &points)
            .unwrap_err();
        assert_eq!(err, Error::NonFinite);
    }

    proptest!(
        /// Every point ends up with its nearest center.
        #[test]
        fn assigned_to_nearest_center(
            points in prop::collection::vec(
                (-100.0..100.0_f64, -100.0..100.0_f64).prop_map(|(x, y)| Point2D::new(x, y)),
                4..200,
            ),
            part_count in 1..4_usize,
            seed in 0..1000_u64,
        ) {
            let mut partition = vec![0; points.len()];
            let metadata = KMeans { part_count, seed, ..Default::default() }
                .partition(&mut partition, &points)
                .unwrap();
            prop_assert_eq!(metadata.centers.len(), part_count);
            for (point, part) in points.iter().zip(&partition) {
                let d = (point - metadata.centers[*part]).norm_squared();
                let (_, best) = nearest(point, &metadata.centers);
                prop_assert!(d <= best, "{} > {}", d, best);
            }
        }
    );
}
