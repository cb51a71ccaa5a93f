use anyhow::{Context, Result, bail};
use clap::Parser;
use scatter_density::{
    BinRange, DensityEngine, DensityGrid, DownresFactor, EngineOptions, ResolutionMode, ScaleKind,
    StaticScales,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Scatter density - bin a point cloud into a 2D density grid
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "scatter-density")]
struct Cli {
    /// Point file: one point per line, `x,y` or `x,y,c`. Lines starting with
    /// '#' are skipped.
    #[arg(value_name = "POINTS")]
    input: PathBuf,

    /// Field delimiter: a single ASCII character, or "tab"
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Treat the first record as a header line
    #[arg(long)]
    has_header: bool,

    /// Output file for the JSON grid (stdout if not specified)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Number of rows (y bins)
    #[arg(long, default_value = "256")]
    rows: usize,

    /// Number of columns (x bins)
    #[arg(long, default_value = "256")]
    cols: usize,

    /// X view range as "min,max" in data units (defaults to the data extent)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    x_range: Option<(f64, f64)>,

    /// Y view range as "min,max" in data units (defaults to the data extent)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    y_range: Option<(f64, f64)>,

    /// X axis scale: linear, log or symlog
    #[arg(long, default_value = "linear")]
    x_scale: String,

    /// Y axis scale: linear, log or symlog
    #[arg(long, default_value = "linear")]
    y_scale: String,

    /// JSON engine options file; explicit flags below override it
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Downres factor (strictly positive integer)
    #[arg(long)]
    downres_factor: Option<f64>,

    /// Symlog linear threshold
    #[arg(long)]
    linthresh: Option<f64>,

    /// Symlog linear-region scale
    #[arg(long)]
    linscale: Option<f64>,

    /// Symlog logarithm base
    #[arg(long)]
    base: Option<f64>,

    /// Compute the coarse, subsampled grid used during interaction
    #[arg(long)]
    downres: bool,

    /// Ignore a third (weight) column and count points instead
    #[arg(long)]
    count_only: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Columns read from a point file
#[derive(Debug, Default, PartialEq)]
struct Points {
    x: Vec<f64>,
    y: Vec<f64>,
    c: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct GridReport {
    rows: usize,
    cols: usize,
    mode: ResolutionMode,
    x_scale: ScaleKind,
    y_scale: ScaleKind,
    /// Range in scale space, ((ymin, ymax), (xmin, xmax))
    range: BinRange,
    total: f64,
    /// Row-major bin values; empty weighted bins serialize as null
    values: Vec<Vec<f64>>,
}

impl From<DensityGrid> for GridReport {
    fn from(grid: DensityGrid) -> Self {
        let total = grid.total();
        Self {
            rows: grid.bins.0,
            cols: grid.bins.1,
            mode: grid.mode,
            x_scale: grid.x_scale,
            y_scale: grid.y_scale,
            range: grid.range,
            total,
            values: grid.values.rows().into_iter().map(|row| row.to_vec()).collect(),
        }
    }
}

fn parse_range(s: &str) -> std::result::Result<(f64, f64), String> {
    let (min, max) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"min,max\", got \"{s}\""))?;
    let min = min
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid range minimum \"{min}\": {e}"))?;
    let max = max
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid range maximum \"{max}\": {e}"))?;
    Ok((min, max))
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("expected a single ASCII character or \"tab\", got \"{s}\"")),
        },
    }
}

fn parse_points<R: Read>(input: R, delimiter: u8, has_header: bool) -> Result<Points> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_header)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut points = Points::default();
    let mut weights = Vec::new();
    let mut columns = None;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line());
        if !(2..=3).contains(&record.len()) {
            bail!(
                "line {}: expected 2 or 3 columns (x, y[, c]), found {}",
                line,
                record.len()
            );
        }
        columns.get_or_insert(record.len());

        let values = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<f64>().with_context(|| {
                    format!("line {}, column {}: invalid number \"{}\"", line, column + 1, field)
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        points.x.push(values[0]);
        points.y.push(values[1]);
        if let Some(&c) = values.get(2) {
            weights.push(c);
        }
    }

    debug!("read {} records", points.x.len());
    if columns == Some(3) {
        points.c = Some(weights);
    }
    Ok(points)
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn load_options(args: &Cli) -> Result<EngineOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            EngineOptions::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EngineOptions::default(),
    };
    if let Some(factor) = args.downres_factor {
        options.downres_factor = DownresFactor::try_from(factor)?.get();
    }
    if args.linthresh.is_some() {
        options.linthresh = args.linthresh;
    }
    if args.linscale.is_some() {
        options.linscale = args.linscale;
    }
    if let Some(base) = args.base {
        options.base = base;
    }
    Ok(options)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing subscriber with environment filter
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&args)?;
    debug!(?options, "engine options");

    let start_time = Instant::now();
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut points = parse_points(BufReader::new(file), args.delimiter, args.has_header)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    if args.count_only {
        points.c = None;
    }
    info!(
        "Loaded {} points from {} in {:?}",
        points.x.len(),
        args.input.display(),
        start_time.elapsed()
    );

    let x_range = args.x_range.unwrap_or_else(|| extent(&points.x));
    let y_range = args.y_range.unwrap_or_else(|| extent(&points.y));

    let scales = StaticScales::new(args.x_scale.as_str(), args.y_scale.as_str());
    let mut engine = DensityEngine::new(scales, points.x, points.y, points.c, &options)?;
    if args.downres {
        engine.downres();
    }

    let compute_start = Instant::now();
    let grid = engine.compute_histogram((args.rows, args.cols), (y_range, x_range))?;
    info!(
        "Binned into {}x{} ({} mode) in {:?}",
        grid.bins.0,
        grid.bins.1,
        grid.mode,
        compute_start.elapsed()
    );

    let report = GridReport::from(grid);
    let json = serde_json::to_string(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote grid to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
