//! Drawing surfaces.
//!
//! Plotting routines never draw on an implicit, global canvas. They take a
//! [`Surface`] and append shapes to it. [`Figure`] is the surface shipped
//! with this crate: it records shapes and can render them as SVG.

use crate::geometry::BoundingBox;
use crate::geometry::Ellipse;
use crate::geometry::Point2D;
use crate::palette::Color;
use itertools::Itertools as _;

/// Visual attributes of a shape.
///
/// Sizes follow the usual plotting conventions: `size` is the area of a
/// scatter marker in square points, `line_width` is in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    /// Fill color, `None` for hollow shapes.
    pub fill: Option<Color>,
    /// Outline color, `None` for no outline.
    pub edge: Option<Color>,
    /// Opacity, from 0 (transparent) to 1 (opaque).
    pub alpha: f64,
    pub line_width: f64,
    pub size: f64,
    /// Shapes with a higher z-order are drawn on top.
    pub z_order: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            edge: None,
            alpha: 1.0,
            line_width: 1.0,
            size: 36.0,
            z_order: 0,
        }
    }
}

impl Style {
    pub fn fill(self, color: Color) -> Self {
        Self {
            fill: Some(color),
            ..self
        }
    }

    pub fn edge(self, color: Color) -> Self {
        Self {
            edge: Some(color),
            ..self
        }
    }

    pub fn alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    pub fn line_width(self, line_width: f64) -> Self {
        Self { line_width, ..self }
    }

    pub fn size(self, size: f64) -> Self {
        Self { size, ..self }
    }

    pub fn z_order(self, z_order: i32) -> Self {
        Self { z_order, ..self }
    }
}

/// Something shapes can be drawn on.
pub trait Surface {
    /// Make one unit on the x-axis as long as one unit on the y-axis.
    fn set_equal_aspect(&mut self);

    /// Draw data points.
    fn scatter(&mut self, points: &[Point2D], style: Style);

    /// Draw point markers, such as cluster centers.
    fn markers(&mut self, points: &[Point2D], style: Style);

    fn add_circle(&mut self, center: Point2D, radius: f64, style: Style);

    fn add_ellipse(&mut self, ellipse: Ellipse, style: Style);
}

impl<S> Surface for &mut S
where
    S: Surface + ?Sized,
{
    fn set_equal_aspect(&mut self) {
        (**self).set_equal_aspect()
    }

    fn scatter(&mut self, points: &[Point2D], style: Style) {
        (**self).scatter(points, style)
    }

    fn markers(&mut self, points: &[Point2D], style: Style) {
        (**self).markers(points, style)
    }

    fn add_circle(&mut self, center: Point2D, radius: f64, style: Style) {
        (**self).add_circle(center, radius, style)
    }

    fn add_ellipse(&mut self, ellipse: Ellipse, style: Style) {
        (**self).add_ellipse(ellipse, style)
    }
}

/// A shape recorded by a [`Figure`].
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Scatter { points: Vec<Point2D>, style: Style },
    Markers { points: Vec<Point2D>, style: Style },
    Circle { center: Point2D, radius: f64, style: Style },
    Ellipse { ellipse: Ellipse, style: Style },
}

impl Shape {
    pub fn style(&self) -> &Style {
        match self {
            Shape::Scatter { style, .. }
            | Shape::Markers { style, .. }
            | Shape::Circle { style, .. }
            | Shape::Ellipse { style, .. } => style,
        }
    }

    /// Returns the region covered by the shape in data coordinates.
    ///
    /// Markers are counted as points since their on-screen size does not
    /// depend on the data.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Shape::Scatter { points, .. } | Shape::Markers { points, .. } => {
                BoundingBox::from_points(points.iter().cloned())
            }
            Shape::Circle { center, radius, .. } => {
                let half = Point2D::from_element(*radius);
                Some(BoundingBox {
                    p_min: center - half,
                    p_max: center + half,
                })
            }
            Shape::Ellipse { ellipse, .. } => Some(ellipse.bounding_box()),
        }
    }
}

/// An in-memory surface.
///
/// Shapes are kept in the order they were drawn. Use
/// [`Figure::write_svg`] to render them.
#[derive(Clone, Debug, Default)]
pub struct Figure {
    shapes: Vec<Shape>,
    equal_aspect: bool,
}

impl Figure {
    pub fn new() -> Figure {
        Figure::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_equal_aspect(&self) -> bool {
        self.equal_aspect
    }

    /// Returns the distinct fill colors of scattered data points, in drawing
    /// order.
    pub fn scatter_colors(&self) -> Vec<Color> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Scatter { points, style } if !points.is_empty() => style.fill,
                _ => None,
            })
            .unique()
            .collect()
    }

    /// Returns the position of every marker.
    pub fn marker_positions(&self) -> Vec<Point2D> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Markers { points, .. } => Some(points.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn circles(&self) -> impl Iterator<Item = (Point2D, f64, &Style)> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Circle {
                center,
                radius,
                style,
            } => Some((*center, *radius, style)),
            _ => None,
        })
    }

    pub fn ellipses(&self) -> impl Iterator<Item = (&Ellipse, &Style)> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Ellipse { ellipse, style } => Some((ellipse, style)),
            _ => None,
        })
    }

    /// Returns the region covered by all shapes, or `None` if nothing has been
    /// drawn.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.shapes
            .iter()
            .filter_map(Shape::bounding_box)
            .reduce(|a, b| a.union(&b))
    }
}

impl Surface for Figure {
    fn set_equal_aspect(&mut self) {
        self.equal_aspect = true;
    }

    fn scatter(&mut self, points: &[Point2D], style: Style) {
        self.shapes.push(Shape::Scatter {
            points: points.to_vec(),
            style,
        });
    }

    fn markers(&mut self, points: &[Point2D], style: Style) {
        self.shapes.push(Shape::Markers {
            points: points.to_vec(),
            style,
        });
    }

    fn add_circle(&mut self, center: Point2D, radius: f64, style: Style) {
        self.shapes.push(Shape::Circle {
            center,
            radius,
            style,
        });
    }

    fn add_ellipse(&mut self, ellipse: Ellipse, style: Style) {
        self.shapes.push(Shape::Ellipse { ellipse, style });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;

    #[test]
    fn test_style_builder() {
        let style = Style::default()
            .fill(PALETTE[1])
            .edge(Color::BLACK)
            .alpha(0.5)
            .z_order(2);
        assert_eq!(style.fill, Some(PALETTE[1]));
        assert_eq!(style.edge, Some(Color::BLACK));
        assert_eq!(style.alpha, 0.5);
        assert_eq!(style.z_order, 2);
        assert_eq!(style.line_width, 1.0);
    }

    #[test]
    fn test_figure_records_shapes() {
        let mut figure = Figure::new();
        assert_eq!(figure.bounding_box(), None);

        let p = [Point2D::new(0.0, 0.0), Point2D::new(1.0, 2.0)];
        figure.scatter(&p, Style::default().fill(PALETTE[0]));
        figure.scatter(&p[..1], Style::default().fill(PALETTE[0]));
        figure.scatter(&[], Style::default().fill(PALETTE[4]));
        figure.markers(&p[1..], Style::default().fill(Color::YELLOW));
        figure.add_circle(Point2D::new(5.0, 5.0), 1.0, Style::default());

        // Drawing through a mutable reference works the same.
        fn draw(mut surface: impl Surface) {
            surface.set_equal_aspect();
        }
        draw(&mut figure);

        assert!(figure.is_equal_aspect());
        assert_eq!(figure.shapes().len(), 5);
        assert_eq!(figure.scatter_colors(), vec![PALETTE[0]]);
        assert_eq!(figure.marker_positions(), vec![Point2D::new(1.0, 2.0)]);
        assert_eq!(figure.circles().count(), 1);
        assert_eq!(figure.ellipses().count(), 0);

        let bb = figure.bounding_box().unwrap();
        assert_eq!(bb.p_min, Point2D::new(0.0, 0.0));
        assert_eq!(bb.p_max, Point2D::new(6.0, 6.0));
    }
}
