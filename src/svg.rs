//! SVG output for figures.

use crate::geometry::Point2D;
use crate::surface::Figure;
use crate::surface::Shape;
use crate::surface::Style;
use itertools::Itertools as _;
use std::io;

/// Length of the longest side of the rendered image, in points.
const CANVAS_SIZE: f64 = 640.0;

/// Empty space left around the shapes, relative to the longest side.
const MARGIN: f64 = 0.05;

/// Maps data coordinates to SVG coordinates.
///
/// SVG's y-axis points down, so data is flipped around the center of the view
/// box, the same way mesh outlines are.
struct View {
    ymin: f64,
    ymax: f64,
    /// Data units per point, along each axis.
    unit_x: f64,
    unit_y: f64,
}

impl View {
    fn x(&self, p: &Point2D) -> f64 {
        p.x
    }

    fn y(&self, p: &Point2D) -> f64 {
        self.ymax - p.y + self.ymin
    }

    /// Radii, in data units, of a marker of the given area in square points.
    ///
    /// Radii differ when the image is stretched, so that markers still look
    /// round once rendered.
    fn marker_radii(&self, size: f64) -> (f64, f64) {
        let r = f64::sqrt(size) / 2.0;
        (r * self.unit_x, r * self.unit_y)
    }
}

fn write_style<W>(mut w: W, style: &Style) -> io::Result<()>
where
    W: io::Write,
{
    match style.fill {
        Some(color) => write!(w, r#" fill="{color}""#)?,
        None => write!(w, r#" fill="none""#)?,
    }
    if let Some(color) = style.edge {
        write!(
            w,
            r#" stroke="{color}" stroke-width="{}" vector-effect="non-scaling-stroke""#,
            style.line_width,
        )?;
    }
    if style.alpha < 1.0 {
        write!(w, r#" opacity="{}""#, style.alpha)?;
    }
    Ok(())
}

fn write_shape<W>(mut w: W, view: &View, shape: &Shape) -> io::Result<()>
where
    W: io::Write,
{
    match shape {
        Shape::Scatter { points, style } | Shape::Markers { points, style } => {
            if points.is_empty() {
                return Ok(());
            }
            let (rx, ry) = view.marker_radii(style.size);
            write!(w, "<g")?;
            write_style(&mut w, style)?;
            writeln!(w, ">")?;
            for p in points {
                if rx == ry {
                    writeln!(
                        w,
                        r#"<circle cx="{}" cy="{}" r="{rx}"/>"#,
                        view.x(p),
                        view.y(p),
                    )?;
                } else {
                    writeln!(
                        w,
                        r#"<ellipse cx="{}" cy="{}" rx="{rx}" ry="{ry}"/>"#,
                        view.x(p),
                        view.y(p),
                    )?;
                }
            }
            writeln!(w, "</g>")?;
        }
        Shape::Circle {
            center,
            radius,
            style,
        } => {
            write!(
                w,
                r#"<circle cx="{}" cy="{}" r="{radius}""#,
                view.x(center),
                view.y(center),
            )?;
            write_style(&mut w, style)?;
            writeln!(w, "/>")?;
        }
        Shape::Ellipse { ellipse, style } => {
            let cx = view.x(&ellipse.center);
            let cy = view.y(&ellipse.center);
            // Flipping the y-axis turns counter-clockwise into clockwise.
            write!(
                w,
                r#"<ellipse cx="{cx}" cy="{cy}" rx="{}" ry="{}" transform="rotate({} {cx} {cy})""#,
                ellipse.width / 2.0,
                ellipse.height / 2.0,
                -ellipse.angle,
            )?;
            write_style(&mut w, style)?;
            writeln!(w, "/>")?;
        }
    }
    Ok(())
}

impl Figure {
    /// Writes the figure as an SVG document.
    ///
    /// Shapes are drawn by increasing z-order, and in drawing order for equal
    /// z-orders. Unless [`crate::Surface::set_equal_aspect`] has been called,
    /// the image is stretched to a square. Circles and ellipses are stretched
    /// along with the data, scatter markers are not.
    ///
    /// Wrapping `w` in a [`std::io::BufWriter`] is recommended.
    pub fn write_svg<W>(&self, mut w: W) -> io::Result<()>
    where
        W: io::Write,
    {
        let bb = match self.bounding_box() {
            Some(v) => v,
            None => {
                return writeln!(w, r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
            }
        };
        let side = f64::max(bb.width(), bb.height());
        let side = if side > 0.0 { side } else { 1.0 };
        let bb = bb.inflate(MARGIN * side);
        let side = side * (1.0 + 2.0 * MARGIN);

        let xmin = bb.p_min.x;
        let ymin = bb.p_min.y;
        let width = f64::max(bb.width(), f64::EPSILON);
        let height = f64::max(bb.height(), f64::EPSILON);
        let (canvas_width, canvas_height, aspect) = if self.is_equal_aspect() {
            (
                CANVAS_SIZE * width / side,
                CANVAS_SIZE * height / side,
                "xMidYMid meet",
            )
        } else {
            (CANVAS_SIZE, CANVAS_SIZE, "none")
        };
        let (unit_x, unit_y) = if self.is_equal_aspect() {
            (side / CANVAS_SIZE, side / CANVAS_SIZE)
        } else {
            (width / CANVAS_SIZE, height / CANVAS_SIZE)
        };
        writeln!(
            w,
            r#"<svg viewBox="{xmin} {ymin} {width} {height}" width="{canvas_width}" height="{canvas_height}" preserveAspectRatio="{aspect}" xmlns="http://www.w3.org/2000/svg">"#,
        )?;

        let view = View {
            ymin: bb.p_min.y,
            ymax: bb.p_max.y,
            unit_x,
            unit_y,
        };
        for shape in self
            .shapes()
            .iter()
            .sorted_by_key(|shape| shape.style().z_order)
        {
            write_shape(&mut w, &view, shape)?;
        }

        writeln!(w, "</svg>")?;

        Ok(())
    }
}
