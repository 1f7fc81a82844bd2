use anyhow::Context as _;
use anyhow::Result;
use grappe::mixture::Component;
use grappe::mixture::GaussianMixture;
use grappe::nalgebra::Matrix2;
use grappe::nalgebra::Vector2;
use grappe::Covariance;
use grappe::Point2D;
use rand::SeedableRng as _;
use rand_distr::Distribution as _;
use std::fs;
use std::io;

/// Opens the given file for reading, or stdin if no file or `-` is given.
pub fn reader(filename: Option<&String>) -> Result<Box<dyn io::BufRead>> {
    Ok(match filename.map(String::as_str) {
        None | Some("-") => Box::new(io::stdin().lock()),
        Some(filename) => {
            let file = fs::File::open(filename)
                .with_context(|| format!("failed to open {filename:?}"))?;
            Box::new(io::BufReader::new(file))
        }
    })
}

/// Opens the given file for writing, or stdout if no file or `-` is given.
pub fn writer(filename: Option<&String>) -> Result<Box<dyn io::Write>> {
    Ok(match filename.map(String::as_str) {
        None | Some("-") => Box::new(io::BufWriter::new(io::stdout().lock())),
        Some(filename) => {
            let file = fs::File::create(filename)
                .with_context(|| format!("failed to create {filename:?}"))?;
            Box::new(io::BufWriter::new(file))
        }
    })
}

fn parse_f64(field: &str) -> Result<f64> {
    let f = field
        .parse::<f64>()
        .with_context(|| format!("{field:?} is not a valid float"))?;
    if !f.is_finite() {
        anyhow::bail!("{field:?} is not finite");
    }
    Ok(f)
}

/// Iterates over the meaningful lines of a text file, along with their line
/// numbers.
///
/// Everything after a `#` is a comment, and blank lines are skipped.
fn records<R>(r: R) -> impl Iterator<Item = Result<(usize, Vec<f64>)>>
where
    R: io::BufRead,
{
    r.lines().enumerate().filter_map(|(idx, line)| {
        let lineno = idx + 1;
        let line = match line {
            Ok(v) => v,
            Err(err) => {
                return Some(Err(anyhow::Error::new(err).context(format!("line {lineno}"))))
            }
        };
        let content = match line.find('#') {
            Some(comment) => &line[..comment],
            None => &line[..],
        };
        if content.trim().is_empty() {
            return None;
        }
        let fields = content
            .split_whitespace()
            .map(parse_f64)
            .collect::<Result<Vec<f64>>>()
            .with_context(|| format!("line {lineno}"));
        Some(fields.map(|fields| (lineno, fields)))
    })
}

/// Reads a point file: one point per line, given as two whitespace-separated
/// coordinates.
///
/// Wrapping `r` in a [`std::io::BufReader`] is recommended.
pub fn read_points<R>(r: R) -> Result<Vec<Point2D>>
where
    R: io::BufRead,
{
    records(r)
        .map(|record| -> Result<Point2D> {
            let (lineno, fields) = record?;
            match fields[..] {
                [x, y] => Ok(Point2D::new(x, y)),
                _ => anyhow::bail!(
                    "line {lineno}: expected 2 coordinates, got {}",
                    fields.len(),
                ),
            }
        })
        .collect()
}

/// Reads a mixture file: one component per line, given as its weight, the
/// two coordinates of its mean, then its covariance.
///
/// The covariance is made of one (spherical), two (diagonal) or four (full,
/// row-major) values.
pub fn read_mixture<R>(r: R) -> Result<GaussianMixture>
where
    R: io::BufRead,
{
    let components = records(r)
        .map(|record| -> Result<Component> {
            let (lineno, fields) = record?;
            let (weight, mean, covariance) = match fields[..] {
                [w, x, y, v] => (w, Point2D::new(x, y), Covariance::Spherical(v)),
                [w, x, y, vx, vy] => (
                    w,
                    Point2D::new(x, y),
                    Covariance::Diagonal(Vector2::new(vx, vy)),
                ),
                [w, x, y, a, b, c, d] => (
                    w,
                    Point2D::new(x, y),
                    Covariance::Full(Matrix2::new(a, b, c, d)),
                ),
                _ => anyhow::bail!(
                    "line {lineno}: expected 4, 5 or 7 values, got {}",
                    fields.len(),
                ),
            };
            Ok(Component {
                mean,
                covariance,
                weight,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let model = GaussianMixture::new(components)?;
    Ok(model)
}

/// Parameters of the Gaussian blobs generated by [`blobs`].
#[derive(Clone, Debug, PartialEq)]
pub struct Blobs {
    /// Number of points per blob.
    pub count: usize,
    pub stddev: f64,
    pub centers: Vec<Point2D>,
}

/// Parses a blob definition of the form `COUNT,STDDEV,X1,Y1[,X2,Y2...]`.
pub fn parse_blobs(definition: &str) -> Result<Blobs> {
    let mut args = definition.split(',');

    let count = args.next().context("empty definition")?;
    let count = count
        .parse::<usize>()
        .with_context(|| format!("arg {count:?} is not a valid point count"))?;

    let stddev = args.next().context("missing standard deviation")?;
    let stddev = parse_f64(stddev)?;
    if stddev < 0.0 {
        anyhow::bail!("standard deviation must be non-negative");
    }

    let coordinates = args.map(parse_f64).collect::<Result<Vec<f64>>>()?;
    if coordinates.is_empty() {
        anyhow::bail!("expected at least one center");
    }
    if coordinates.len() % 2 != 0 {
        anyhow::bail!("centers must be given as X,Y pairs");
    }
    let centers = coordinates
        .chunks_exact(2)
        .map(|c| Point2D::new(c[0], c[1]))
        .collect();

    Ok(Blobs {
        count,
        stddev,
        centers,
    })
}

/// Draws `blobs.count` points around each center, following an isotropic
/// normal distribution.
///
/// Points are grouped by blob, in center order.
pub fn blobs(definition: &Blobs, seed: u64) -> Result<Vec<Point2D>> {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
    let normal = rand_distr::Normal::new(0.0, definition.stddev)
        .context("invalid standard deviation")?;
    let mut points = Vec::with_capacity(definition.count * definition.centers.len());
    for center in &definition.centers {
        for _ in 0..definition.count {
            let offset = Point2D::new(normal.sample(&mut rng), normal.sample(&mut rng));
            points.push(center + offset);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_points() {
        let input = "# x y\n0 1\n\n  2.5\t-3 # comment\n1e2 4\n";
        let points = read_points(input.as_bytes()).unwrap();
        assert_eq!(
            points,
            [
                Point2D::new(0.0, 1.0),
                Point2D::new(2.5, -3.0),
                Point2D::new(100.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_read_points_errors() {
        let err = read_points("0 1\n1 2 3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");

        let err = read_points("0 1\n\n1 foo\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "line 3");

        let err = read_points("inf 1\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "line 1");
    }

    #[test]
    fn test_read_mixture() {
        let input = "\
            # weight mean covariance\n\
            0.2 0 0 1\n\
            0.3 5 5 1 2\n\
            0.5 -5 5 2 0.5 0.5 1\n";
        let model = read_mixture(input.as_bytes()).unwrap();
        let components = model.components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0].covariance, Covariance::Spherical(1.0));
        assert_eq!(
            components[1].covariance,
            Covariance::Diagonal(Vector2::new(1.0, 2.0))
        );
        assert_eq!(
            components[2].covariance,
            Covariance::Full(Matrix2::new(2.0, 0.5, 0.5, 1.0))
        );
        assert_eq!(components[2].mean, Point2D::new(-5.0, 5.0));
        assert_eq!(components[2].weight, 0.5);
    }

    #[test]
    fn test_read_mixture_errors() {
        let err = read_mixture("1 0 0 1 1 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 1:"), "{err}");

        let err = read_mixture("0.5 0 0 1\n0.2 1 1 1\n".as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<grappe::Error>(),
            Some(&grappe::Error::InvalidWeights)
        );

        let err = read_mixture("# nothing\n".as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<grappe::Error>(),
            Some(&grappe::Error::EmptyModel)
        );
    }

    #[test]
    fn test_parse_blobs() {
        let blobs = parse_blobs("10,1.5,0,0,20,-20").unwrap();
        assert_eq!(
            blobs,
            Blobs {
                count: 10,
                stddev: 1.5,
                centers: vec![Point2D::new(0.0, 0.0), Point2D::new(20.0, -20.0)],
            }
        );

        assert!(parse_blobs("").is_err());
        assert!(parse_blobs("10").is_err());
        assert!(parse_blobs("10,1").is_err());
        assert!(parse_blobs("10,1,0").is_err());
        assert!(parse_blobs("10,-1,0,0").is_err());
        assert!(parse_blobs("ten,1,0,0").is_err());
    }

    #[test]
    fn test_blobs_deterministic() {
        let definition = parse_blobs("10,1,-10,-10,10,10").unwrap();
        let points = blobs(&definition, 3).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points, blobs(&definition, 3).unwrap());
        assert!(points[..10].iter().all(|p| p.x < 0.0 && p.y < 0.0));
        assert!(points[10..].iter().all(|p| p.x > 0.0 && p.y > 0.0));
    }

    proptest!(
        #[test]
        fn generated_blobs_have_the_requested_size(
            count in 0..100_usize,
            stddev in 0.0..10.0_f64,
            centers in prop::collection::vec((-1e3..1e3_f64, -1e3..1e3_f64), 1..5),
            seed in 0..1000_u64,
        ) {
            let mut definition = format!("{count},{stddev}");
            for (x, y) in &centers {
                definition += &format!(",{x},{y}");
            }
            let definition = parse_blobs(&definition).unwrap();
            prop_assert_eq!(definition.centers.len(), centers.len());
            let points = blobs(&definition, seed).unwrap();
            prop_assert_eq!(points.len(), count * centers.len());
            prop_assert!(points.iter().flatten().all(|c| c.is_finite()));
        }
    );
}
