//! `sparkfield` command line.
//!
//! ```text
//! sparkfield [--config <file.json>] [--preset default|backdrop] [--seed <u64>]
//!            [--snapshot <out.png> --size <W>x<H> --frames <N>]
//! ```
//!
//! Without `--snapshot` the showcase window opens. Log output goes to stderr,
//! filtered by `RUST_LOG` (default `warn`).

use std::path::PathBuf;
use std::process::ExitCode;

use sparkfield::offscreen::render_frames;
use sparkfield::{run_showcase, BeamConfig, SeededSource, Size, SparklesConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sparkfield [--config <file.json>] [--preset default|backdrop] [--seed <u64>]
                  [--snapshot <out.png> --size <W>x<H> --frames <N>]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    preset: Option<String>,
    seed: Option<u64>,
    snapshot: Option<PathBuf>,
    size: Option<Size>,
    frames: Option<u32>,
}

fn parse_size(value: &str) -> Option<Size> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some(Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("missing value for {}", flag));
        match flag.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--preset" => parsed.preset = Some(value()?),
            "--seed" => {
                let v = value()?;
                parsed.seed = Some(v.parse().map_err(|_| format!("invalid seed: {}", v))?);
            }
            "--snapshot" => parsed.snapshot = Some(PathBuf::from(value()?)),
            "--size" => {
                let v = value()?;
                parsed.size = Some(parse_size(&v).ok_or_else(|| format!("invalid size: {} (expected WxH)", v))?);
            }
            "--frames" => {
                let v = value()?;
                parsed.frames = Some(v.parse().map_err(|_| format!("invalid frame count: {}", v))?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument: {}\n{}", other, USAGE)),
        }
    }

    Ok(parsed)
}

const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr log subscriber. A second call leaves the first in place.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match (&args.config, &args.preset) {
        (Some(path), _) => SparklesConfig::load(path)?,
        (None, Some(name)) => SparklesConfig::preset(name).ok_or_else(|| format!("unknown preset: {}", name))?,
        (None, None) => SparklesConfig::default(),
    };

    let Some(out) = args.snapshot else {
        return Ok(run_showcase(config, BeamConfig::default().centered(), args.seed)?);
    };

    let size = args.size.unwrap_or(Size::new(1280, 720));
    let frames = args.frames.unwrap_or(120);
    let mut source = match args.seed {
        Some(seed) => SeededSource::new(seed),
        None => SeededSource::from_time(),
    };

    let (canvas, background) = render_frames(config, size, frames, &mut source)?;
    canvas.save_png(&out, background)?;
    println!("Wrote {}x{} snapshot after {} frames to {}", size.width, size.height, frames, out.display());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
