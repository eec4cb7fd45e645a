use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use par_lcs::loader::load_pair;
use par_lcs::{Backend, LcsEngine, LcsError};

#[derive(Parser)]
#[command(name = "par-lcs")]
#[command(about = "Length of the longest common subsequence of two DNA sequences, computed row by row across parallel workers", long_about = None)]
#[command(version)]
struct Cli {
    /// First sequence file (declared length, then symbols); supplies the columns
    #[arg(value_name = "FILE1")]
    first: PathBuf,

    /// Second sequence file; supplies one row per symbol
    #[arg(value_name = "FILE2")]
    second: PathBuf,

    /// Number of workers
    #[arg(value_name = "WORKERS")]
    workers: usize,

    /// Concurrency backend: threads, processes or rayon
    #[arg(short = 'b', long, value_name = "BACKEND", default_value = "threads")]
    backend: Backend,
}

fn init_logging() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run(cli: &Cli) -> Result<u32, LcsError> {
    // Configuration and both inputs are checked before any worker starts.
    let engine = LcsEngine::with_backend(cli.workers, cli.backend)?;
    let (columns, rows) = load_pair(&cli.first, &cli.second)?;
    let report = engine.run(&columns, &rows)?;
    if report.barrier_faults > 0 {
        eprintln!(
            "par-lcs: warning: {} barrier wait(s) returned an unexpected status",
            report.barrier_faults
        );
    }
    Ok(report.score)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(score) => {
            println!("{score}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("par-lcs: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
