//! Report the best-selling symbols of a PITCH capture.
//!
//! # Usage
//!
//! ```bash
//! # Top 10 symbols by executed value
//! cargo run --release --bin pitch_top_n -- data/pitch_example_data
//!
//! # Top 5, skipping undecodable lines, failures exported for inspection
//! cargo run --release --bin pitch_top_n -- data/pitch_example_data \
//!     --top 5 --skip-malformed --failures-out failures.csv
//!
//! # Read unframed records from stdin, JSON output
//! cat records.txt | cargo run --release --bin pitch_top_n -- - --no-framing --json
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;

use pitch_sales::{
    FailureCategory, FileSource, SalesTracker, SourceMetadata, TopN, TrackerConfig,
    DEFAULT_TOP_N,
};

#[derive(Parser)]
#[command(name = "pitch_top_n")]
#[command(about = "Rank symbols of a PITCH feed by executed sale value")]
struct Args {
    /// PITCH capture file, or `-` for stdin
    input: PathBuf,

    /// Number of symbols to report
    #[arg(short = 'n', long = "top", default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Log and skip lines that do not decode instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Input lines have no leading `S` framing character
    #[arg(long)]
    no_framing: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Export rejected messages (`.csv` for CSV, JSON otherwise)
    #[arg(long, value_name = "PATH")]
    failures_out: Option<PathBuf>,

    /// Print every rejected message
    #[arg(short, long)]
    verbose: bool,
}

fn open_source(args: &Args) -> pitch_sales::Result<FileSource> {
    let source = if args.input.as_os_str() == "-" {
        FileSource::from_reader(std::io::stdin())
            .with_metadata(SourceMetadata::new().with_provider("stdin"))
    } else {
        FileSource::open(&args.input)?
    };
    Ok(source.with_framing(!args.no_framing))
}

fn print_table(report: &TopN) {
    let width = report
        .iter()
        .map(|e| e.ticker.trim_end().len())
        .max()
        .unwrap_or(6)
        .max(6);

    for (rank, entry) in report.iter().enumerate() {
        println!(
            "{:>3}. {:<width$} {:>16}",
            rank + 1,
            entry.ticker.trim_end(),
            entry.value
        );
    }
}

fn run(args: &Args) -> pitch_sales::Result<()> {
    let config = TrackerConfig::new()
        .with_top_n(args.top)
        .with_skip_malformed(args.skip_malformed)
        .with_logging(args.verbose);
    let mut tracker = SalesTracker::with_config(config);

    let start = Instant::now();
    tracker.process_source(open_source(args)?)?;
    log::info!("Finished in {:.2}s", start.elapsed().as_secs_f64());

    let report = tracker.report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    let failures = tracker.failures();
    if !failures.is_empty() {
        eprintln!(
            "{} message(s) rejected; see --failures-out for details",
            failures.len()
        );
        for category in FailureCategory::ALL {
            let count = failures.count_by_category(category);
            if count > 0 {
                eprintln!("  {:<22} {count}", category.name());
            }
        }
        if args.verbose {
            for failure in failures {
                eprintln!("  {failure}");
            }
        }
    }

    if let Some(path) = &args.failures_out {
        failures.export(path)?;
        log::info!("Wrote {} failure(s) to {}", failures.len(), path.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
