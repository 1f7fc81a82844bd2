use anyhow::Context as _;
use anyhow::Result;
use grappe::Figure;
use std::env;
use std::io::Write as _;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

const USAGE: &str = "Usage: cluster-svg [options] [in-points [out-svg]] <in.points >out.svg";

const HELP_AFTER: &str = "
INPUT FORMATS
    Point files hold one point per line, as two whitespace-separated
    coordinates. Mixture files hold one component per line: its weight, the
    coordinates of its mean, then one (spherical), two (diagonal) or four
    (full, row-major) covariance values. In both formats, blank lines and
    everything after '#' are ignored.

ENVIRONMENT
    LOG    log filter, e.g. LOG=grappe=debug
";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt(
        "k",
        "clusters",
        "run K-means with this many clusters (default 2)",
        "N",
    );
    options.optopt(
        "m",
        "mixture",
        "plot a pre-fit mixture model instead of K-means",
        "FILE",
    );
    options.optopt(
        "g",
        "generate",
        "generate gaussian blobs instead of reading points",
        "COUNT,STDDEV,X1,Y1[,X2,Y2...]",
    );
    options.optopt(
        "s",
        "seed",
        "seed for point generation and K-means (default 0)",
        "N",
    );
    options.optopt("t", "trace", "emit a chrome trace", "FILE");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        eprint!("{HELP_AFTER}");
        return Ok(());
    }
    // Generated points take the place of the input file.
    let (input, output) = match (matches.opt_present("g"), &matches.free[..]) {
        (false, []) => (None, None),
        (false, [input]) => (Some(input), None),
        (false, [input, output]) => (Some(input), Some(output)),
        (true, []) => (None, None),
        (true, [output]) => (None, Some(output)),
        _ => anyhow::bail!("too many arguments\n\n{}", options.usage(USAGE)),
    };
    if matches.opt_present("k") && matches.opt_present("m") {
        anyhow::bail!("options 'clusters' and 'mixture' are mutually exclusive");
    }

    let registry = Registry::default().with(EnvFilter::from_env("LOG")).with(
        HierarchicalLayer::new(4)
            .with_thread_ids(true)
            .with_targets(true)
            .with_bracketed_fields(true),
    );
    let _chrome_trace_guard = match matches.opt_str("t") {
        Some(filename) => {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(filename)
                .build();
            registry.with(chrome_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    let seed: u64 = match matches.opt_str("s") {
        Some(seed) => seed
            .parse()
            .with_context(|| format!("invalid seed {seed:?}"))?,
        None => 0,
    };

    let points = match matches.opt_str("g") {
        Some(definition) => {
            let definition = grappe_tools::parse_blobs(&definition)
                .with_context(|| format!("invalid blob definition {definition:?}"))?;
            grappe_tools::blobs(&definition, seed)?
        }
        None => {
            let input = grappe_tools::reader(input)?;
            grappe_tools::read_points(input).context("failed to read point file")?
        }
    };
    tracing::info!(point_count = points.len(), "loaded points");

    let mut figure = Figure::new();

    match matches.opt_str("m") {
        Some(filename) => {
            let input = grappe_tools::reader(Some(&filename))?;
            let model = grappe_tools::read_mixture(input)
                .with_context(|| format!("failed to read mixture file {filename:?}"))?;
            grappe::plot_gmm(&mut figure, &model, &points)
                .context("failed to plot mixture model")?;
        }
        None => {
            let part_count: usize = match matches.opt_str("k") {
                Some(k) => k
                    .parse()
                    .with_context(|| format!("invalid cluster count {k:?}"))?,
                None => 2,
            };
            let k_means = grappe::KMeans {
                part_count,
                seed,
                ..Default::default()
            };
            grappe::plot_kmeans_with(&mut figure, &points, k_means)
                .context("failed to plot K-means clusters")?;
        }
    }

    let mut output = grappe_tools::writer(output)?;
    figure
        .write_svg(&mut output)
        .context("failed to write SVG")?;
    output.flush().context("failed to write SVG")?;

    Ok(())
}
