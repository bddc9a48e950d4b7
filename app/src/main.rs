use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use pcd_core::pointcloud::normalization::OverflowPolicy;
use pcd_volume::config::{DEFAULT_EXECUTABLE, DEFAULT_INPUT, DEFAULT_OUTPUT};
use pcd_volume::{compute_volume, RunnerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "pctvolume",
    about = "Computes the volume of a weighted point cloud with an external program",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, default_value = DEFAULT_INPUT, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "FILE")]
    output: PathBuf,

    /// Volume computation program, fed the cloud on stdin
    #[arg(short, long, default_value = DEFAULT_EXECUTABLE, value_name = "PROGRAM")]
    executable: PathBuf,

    /// Value for fields missing from rows with fewer than four columns
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    fill: f64,

    /// Fail on rows with more than four columns instead of truncating them
    #[arg(long)]
    reject_extra_columns: bool,

    /// Kill the program after this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Print a JSON summary of the run to stdout
    #[arg(long)]
    report: bool,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("invalid number of seconds: {e}"))?;
    if seconds <= 0.0 {
        return Err("timeout must be positive".to_string());
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

fn build_config(args: &Cli) -> RunnerConfig {
    let overflow = if args.reject_extra_columns {
        OverflowPolicy::Reject
    } else {
        OverflowPolicy::Truncate
    };

    let mut builder = RunnerConfig::builder()
        .input(&args.input)
        .output(&args.output)
        .executable(&args.executable)
        .fill(args.fill)
        .overflow(overflow);
    if let Some(timeout) = args.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();

    log::info!("input file: {:?}", args.input);
    log::info!("output file: {:?}", args.output);
    log::info!("executable: {:?}", args.executable);

    let config = build_config(&args);
    let report = match compute_volume(&config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Failed to compute volume: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Elapsed: {} ms", report.elapsed_ms);

    if args.report {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_filenames() {
        let args = Cli::try_parse_from(["pctvolume"]).unwrap();
        let config = build_config(&args);

        assert_eq!(config.input_path, PathBuf::from("test.cloud"));
        assert_eq!(config.output_path, PathBuf::from("test.p"));
        assert_eq!(config.executable_path, PathBuf::from("./pctoffset"));
        assert_eq!(config.timeout, None);
        assert_eq!(config.policy.overflow, OverflowPolicy::Truncate);
        assert_eq!(config.policy.fill, 0.0);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Cli::try_parse_from([
            "pctvolume",
            "-i",
            "bunny.cloud",
            "--output",
            "bunny.p",
            "--executable",
            "/opt/cloudy/pctoffset",
            "--fill",
            "1",
            "--reject-extra-columns",
            "--timeout",
            "1.5",
        ])
        .unwrap();
        let config = build_config(&args);

        assert_eq!(config.input_path, PathBuf::from("bunny.cloud"));
        assert_eq!(config.output_path, PathBuf::from("bunny.p"));
        assert_eq!(config.executable_path, PathBuf::from("/opt/cloudy/pctoffset"));
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.policy.overflow, OverflowPolicy::Reject);
        assert_eq!(config.policy.fill, 1.0);
    }

    #[test]
    fn timeout_must_be_positive() {
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-2").is_err());
        assert!(parse_timeout("soon").is_err());
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }
}
