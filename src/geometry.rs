//! A few useful geometric types

use itertools::Itertools as _;
use nalgebra::Matrix2;
use nalgebra::Vector2;

pub type Point2D = Vector2<f64>;

/// Confidence levels, in standard deviations, drawn for each component.
pub const CONFIDENCE_LEVELS: [f64; 3] = [1.0, 2.0, 3.0];

/// Covariance of a 2D Gaussian.
///
/// The variants follow the usual mixture-model covariance types: a full
/// matrix, per-axis variances, or a single variance shared by both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Covariance {
    Full(Matrix2<f64>),
    Diagonal(Vector2<f64>),
    Spherical(f64),
}

/// Lengths and orientation of the axes of a covariance's 1σ ellipse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrincipalAxes {
    pub width: f64,
    pub height: f64,
    /// Counter-clockwise angle between the x-axis and the width axis, in
    /// degrees, within `(-90, 90]`.
    pub angle: f64,
}

impl Covariance {
    /// Returns the covariance as a full 2x2 matrix.
    pub fn to_matrix(&self) -> Matrix2<f64> {
        match *self {
            Covariance::Full(m) => m,
            Covariance::Diagonal(d) => Matrix2::from_diagonal(&d),
            Covariance::Spherical(v) => Matrix2::from_diagonal_element(v),
        }
    }

    /// Whether this is a valid covariance, ie. finite, symmetric and positive
    /// semi-definite.
    pub fn is_valid(&self) -> bool {
        match *self {
            Covariance::Full(m) => {
                if m.iter().any(|e| !e.is_finite()) {
                    return false;
                }
                // Tolerances are relative to the largest entry.
                let scale = m.amax();
                let eps = 1e-9 * scale;
                approx::abs_diff_eq!(m[(0, 1)], m[(1, 0)], epsilon = eps)
                    && -eps <= m[(0, 0)]
                    && -eps <= m[(1, 1)]
                    && -eps * scale <= m.determinant()
            }
            Covariance::Diagonal(d) => d.iter().all(|v| v.is_finite() && 0.0 <= *v),
            Covariance::Spherical(v) => v.is_finite() && 0.0 <= v,
        }
    }

    /// Computes the axes of the 1σ ellipse.
    ///
    /// Full matrices go through a singular value decomposition: the width
    /// follows the first left singular vector (the direction of greatest
    /// variance). Diagonal and spherical covariances are axis-aligned and keep
    /// their per-axis order.
    pub fn principal_axes(&self) -> PrincipalAxes {
        match *self {
            Covariance::Full(m) => {
                let svd = nalgebra::SVD::new(m, true, false);
                let s = svd.singular_values;
                let u = match svd.u {
                    Some(u) => u,
                    // compute_u is set, u is always there.
                    None => Matrix2::identity(),
                };
                let (first, second) = if s[0] < s[1] { (1, 0) } else { (0, 1) };
                let angle = f64::atan2(u[(1, first)], u[(0, first)]).to_degrees();
                PrincipalAxes {
                    width: 2.0 * f64::sqrt(s[first]),
                    height: 2.0 * f64::sqrt(s[second]),
                    angle: normalize_angle(angle),
                }
            }
            Covariance::Diagonal(d) => PrincipalAxes {
                width: 2.0 * f64::sqrt(d.x),
                height: 2.0 * f64::sqrt(d.y),
                angle: 0.0,
            },
            Covariance::Spherical(v) => PrincipalAxes {
                width: 2.0 * f64::sqrt(v),
                height: 2.0 * f64::sqrt(v),
                angle: 0.0,
            },
        }
    }
}

/// Maps an axis direction to `(-90, 90]`.
///
/// Singular vectors are defined up to their sign, so `a` and `a ± 180` are the
/// same ellipse.
fn normalize_angle(mut angle: f64) -> f64 {
    while angle <= -90.0 {
        angle += 180.0;
    }
    while 90.0 < angle {
        angle -= 180.0;
    }
    angle
}

/// A rotated ellipse, as drawn on a [`crate::Surface`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    pub center: Point2D,
    /// Full length of the axis rotated by `angle` from the x-axis.
    pub width: f64,
    /// Full length of the other axis.
    pub height: f64,
    /// Rotation in degrees, counter-clockwise.
    pub angle: f64,
}

impl Ellipse {
    pub fn new(center: Point2D, axes: PrincipalAxes) -> Ellipse {
        Ellipse {
            center,
            width: axes.width,
            height: axes.height,
            angle: axes.angle,
        }
    }

    /// Returns the ellipse with both axes multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Ellipse {
        Ellipse {
            width: factor * self.width,
            height: factor * self.height,
            ..*self
        }
    }

    /// Whether `point` lies inside the ellipse or on its boundary.
    ///
    /// Degenerate ellipses contain nothing but their center.
    pub fn contains(&self, point: &Point2D) -> bool {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let d = point - self.center;
        let u = cos * d.x + sin * d.y;
        let v = -sin * d.x + cos * d.y;
        let a = self.width / 2.0;
        let b = self.height / 2.0;
        if a == 0.0 || b == 0.0 {
            return d == Point2D::zeros();
        }
        (u / a).powi(2) + (v / b).powi(2) <= 1.0 + 1e-12
    }

    /// Returns the axis-aligned box around the ellipse.
    pub fn bounding_box(&self) -> BoundingBox {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let a = self.width / 2.0;
        let b = self.height / 2.0;
        let half = Point2D::new(
            f64::hypot(a * cos, b * sin),
            f64::hypot(a * sin, b * cos),
        );
        BoundingBox {
            p_min: self.center - half,
            p_max: self.center + half,
        }
    }
}

/// Computes the 1σ, 2σ and 3σ ellipses of a Gaussian.
pub fn confidence_ellipses(center: Point2D, covariance: &Covariance) -> [Ellipse; 3] {
    let unit = Ellipse::new(center, covariance.principal_axes());
    CONFIDENCE_LEVELS.map(|level| unit.scaled(level))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub p_min: Point2D,
    pub p_max: Point2D,
}

impl BoundingBox {
    /// Returns the smallest box containing all points, or `None` if there are
    /// no points.
    pub fn from_points<P>(points: P) -> Option<BoundingBox>
    where
        P: IntoIterator<Item = Point2D>,
    {
        points.into_iter().fold(None, |bb, p| {
            Some(match bb {
                None => BoundingBox { p_min: p, p_max: p },
                Some(bb) => BoundingBox {
                    p_min: bb.p_min.inf(&p),
                    p_max: bb.p_max.sup(&p),
                },
            })
        })
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            p_min: self.p_min.inf(&other.p_min),
            p_max: self.p_max.sup(&other.p_max),
        }
    }

    pub fn width(&self) -> f64 {
        self.p_max.x - self.p_min.x
    }

    pub fn height(&self) -> f64 {
        self.p_max.y - self.p_min.y
    }

    /// Grows the box by `margin` on each side.
    pub fn inflate(&self, margin: f64) -> BoundingBox {
        let margin = Point2D::from_element(margin);
        BoundingBox {
            p_min: self.p_min - margin,
            p_max: self.p_max + margin,
        }
    }
}

/// Returns the mean of the given points, or `None` if there are none.
pub fn center(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().sum::<Point2D>() / points.len() as f64)
}

/// Returns the distance between `center` and its furthest point, or `None` if
/// there are no points.
pub fn max_distance(center: &Point2D, points: &[Point2D]) -> Option<f64> {
    points
        .iter()
        .map(|p| (p - center).norm())
        .max_by(crate::partial_cmp)
}

/// Splits points into one group per part, in part order.
///
/// Every ID of `partition` must be lower than `part_count`.
pub fn group_by_part(
    points: &[Point2D],
    partition: &[usize],
    part_count: usize,
) -> Vec<Vec<Point2D>> {
    debug_assert_eq!(points.len(), partition.len());
    let mut groups = vec![Vec::new(); part_count];
    for (point, part) in points.iter().zip(partition) {
        groups[*part].push(*point);
    }
    groups
}

/// Returns the number of distinct parts that appear in `partition`.
pub fn nonempty_part_count(partition: &[usize]) -> usize {
    partition.iter().unique().count()
}
