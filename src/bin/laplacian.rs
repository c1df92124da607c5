// Apply the Laplacian edge filter to a P6 image and write `<stem>_laplacian.ppm`
// next to it.
//
// Usage: laplacian <image.ppm>
// Worker count comes from LAPLACIAN_WORKERS or a TOML file named by
// LAPLACIAN_CONFIG.

use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use colored::Colorize;
use log::info;

use laplacian::{ppm, Config, FilterError};

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    let input = args.next()?;
    if args.next().is_some() {
        return None;
    }
    Some(PathBuf::from(input))
}

/// Decode, filter and encode. Returns the time spent filtering.
fn run(input: &Path, config: &Config) -> Result<Duration, FilterError> {
    let source = ppm::read_ppm(input)?;

    let start = Instant::now();
    let result = laplacian::filter(&source, config)?;
    let elapsed = start.elapsed();

    let output = ppm::output_path(input, &config.suffix)?;
    ppm::write_ppm(&output, &result)?;
    info!("wrote {}", output.display());

    Ok(elapsed)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let program = env::args().next().unwrap_or_else(|| "laplacian".to_string());
    let input = match parse_args(env::args().skip(1)) {
        Some(input) => input,
        None => {
            eprintln!("Usage: {} <image.ppm>", program);
            process::exit(1);
        }
    };

    let outcome = Config::from_env().and_then(|config| {
        info!("filtering with {} workers", config.workers);
        run(&input, &config)
    });

    match outcome {
        Ok(elapsed) => {
            println!("Elapsed Time: {:.3}", elapsed.as_secs_f64());
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            process::exit(1);
        }
    }
}
