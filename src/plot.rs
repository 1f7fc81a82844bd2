//! Drawing clustering results.

use crate::algorithms::KMeans;
use crate::algorithms::KMeansMetadata;
use crate::geometry;
use crate::geometry::Covariance;
use crate::geometry::Point2D;
use crate::mixture::GaussianMixture;
use crate::mixture::MAX_ALPHA;
use crate::palette;
use crate::palette::Color;
use crate::surface::Style;
use crate::surface::Surface;
use crate::Error;
use crate::Partition as _;

const POINT_SIZE: f64 = 40.0;
const CENTER_SIZE: f64 = 100.0;
const CIRCLE_LINE_WIDTH: f64 = 3.0;

const CIRCLE_Z_ORDER: i32 = 1;
const POINT_Z_ORDER: i32 = 2;
const CENTER_Z_ORDER: i32 = 3;

fn point_style(part: usize) -> Style {
    Style::default()
        .fill(palette::color(part))
        .edge(Color::BLACK)
        .size(POINT_SIZE)
        .z_order(POINT_Z_ORDER)
}

fn center_style() -> Style {
    Style::default()
        .fill(palette::CENTER_MARKER)
        .edge(Color::BLACK)
        .size(CENTER_SIZE)
        .z_order(CENTER_Z_ORDER)
}

/// Draws the 1σ, 2σ and 3σ ellipses of a Gaussian.
///
/// # Example
///
/// ```rust
/// use grappe::{Covariance, Figure, Point2D, Style};
///
/// let mut figure = Figure::new();
/// grappe::draw_ellipse(
///     &mut figure,
///     Point2D::new(0.0, 0.0),
///     &Covariance::Spherical(4.0),
///     Style::default().alpha(0.2),
/// );
///
/// let widths: Vec<f64> = figure.ellipses().map(|(e, _)| e.width).collect();
/// assert_eq!(widths, [4.0, 8.0, 12.0]);
/// ```
pub fn draw_ellipse<S>(surface: &mut S, position: Point2D, covariance: &Covariance, style: Style)
where
    S: Surface + ?Sized,
{
    for ellipse in geometry::confidence_ellipses(position, covariance) {
        surface.add_ellipse(ellipse, style);
    }
}

/// The boundary drawn around a K-means part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    pub center: Point2D,
    /// Distance from the center to its furthest point, `None` if the part is
    /// empty.
    pub radius: Option<f64>,
}

/// Everything [`plot_kmeans`] computed.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansPlot {
    /// Part ID of each point.
    pub partition: Vec<usize>,
    /// Boundary of each part, in part ID order.
    pub clusters: Vec<Cluster>,
    pub metadata: KMeansMetadata,
}

/// Clusters points with K-means and draws the result.
///
/// Points are colored by part, each center gets a marker, and each part is
/// surrounded by a filled circle that reaches its furthest point.
///
/// K-means runs with a fixed seed, so the same points always give the same
/// drawing.
pub fn plot_kmeans<S>(
    surface: &mut S,
    points: &[Point2D],
    cluster_count: usize,
) -> Result<KMeansPlot, Error>
where
    S: Surface + ?Sized,
{
    let k_means = KMeans {
        part_count: cluster_count,
        ..Default::default()
    };
    plot_kmeans_with(surface, points, k_means)
}

/// Same as [`plot_kmeans`], with custom K-means settings.
pub fn plot_kmeans_with<S>(
    surface: &mut S,
    points: &[Point2D],
    mut k_means: KMeans,
) -> Result<KMeansPlot, Error>
where
    S: Surface + ?Sized,
{
    let mut partition = vec![0; points.len()];
    let metadata = k_means.partition(&mut partition, points)?;
    let clusters = plot_partition(surface, points, &partition, &metadata.centers)?;
    Ok(KMeansPlot {
        partition,
        clusters,
        metadata,
    })
}

/// Draws a partition of points around the given part centers.
///
/// This is the drawing half of [`plot_kmeans`], usable with partitions
/// computed by other means. `centers[i]` is the center of part `i`.
pub fn plot_partition<S>(
    surface: &mut S,
    points: &[Point2D],
    partition: &[usize],
    centers: &[Point2D],
) -> Result<Vec<Cluster>, Error>
where
    S: Surface + ?Sized,
{
    if points.len() != partition.len() {
        return Err(Error::InputLenMismatch {
            expected: points.len(),
            actual: partition.len(),
        });
    }
    let part_count = centers.len();
    if let Some(part) = partition.iter().find(|part| part_count <= **part) {
        return Err(Error::UnknownPart {
            part: *part,
            part_count,
        });
    }
    palette::check_part_count(part_count);

    surface.set_equal_aspect();

    let groups = geometry::group_by_part(points, partition, part_count);
    for (part, group) in groups.iter().enumerate() {
        if !group.is_empty() {
            surface.scatter(group, point_style(part));
        }
    }

    surface.markers(centers, center_style());

    let clusters: Vec<Cluster> = centers
        .iter()
        .zip(&groups)
        .map(|(center, group)| Cluster {
            center: *center,
            radius: geometry::max_distance(center, group),
        })
        .collect();

    for (part, cluster) in clusters.iter().enumerate() {
        let radius = match cluster.radius {
            Some(v) => v,
            None => {
                tracing::warn!(part, "part is empty, its boundary is not drawn");
                continue;
            }
        };
        let style = Style::default()
            .fill(palette::color(part))
            .edge(Color::BLACK)
            .line_width(CIRCLE_LINE_WIDTH)
            .z_order(CIRCLE_Z_ORDER);
        surface.add_circle(cluster.center, radius, style);
    }

    tracing::debug!(
        point_count = points.len(),
        part_count,
        nonempty_parts = geometry::nonempty_part_count(partition),
        "drew partition"
    );

    Ok(clusters)
}

/// Draws points colored by their most likely mixture component, along with
/// the confidence ellipses of each component.
///
/// Ellipses are filled with the color of their component. Their opacity is
/// proportional to the component's weight, and reaches [`MAX_ALPHA`] for the
/// heaviest component.
///
/// Returns the component of each point.
pub fn plot_gmm<S>(
    surface: &mut S,
    model: &GaussianMixture,
    points: &[Point2D],
) -> Result<Vec<usize>, Error>
where
    S: Surface + ?Sized,
{
    if points.iter().flatten().any(|c| !c.is_finite()) {
        return Err(Error::NonFinite);
    }
    let component_count = model.len();
    palette::check_part_count(component_count);

    let partition = model.predict(points);

    surface.set_equal_aspect();

    let groups = geometry::group_by_part(points, &partition, component_count);
    for (component, group) in groups.iter().enumerate() {
        if !group.is_empty() {
            surface.scatter(group, point_style(component));
        }
    }

    let means: Vec<Point2D> = model.components().iter().map(|c| c.mean).collect();
    surface.markers(&means, center_style());

    for (idx, (component, opacity)) in model
        .components()
        .iter()
        .zip(model.opacity_factors())
        .enumerate()
    {
        let style = Style::default()
            .fill(palette::color(idx))
            .alpha(opacity)
            .z_order(CIRCLE_Z_ORDER);
        draw_ellipse(surface, component.mean, &component.covariance, style);
    }

    tracing::debug!(
        point_count = points.len(),
        component_count,
        "drew mixture model"
    );

    Ok(partition)
}
