use std::time::Instant;

use clap::{Parser, ValueEnum};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

use par_lcs::utils::classic_lcs_len;
use par_lcs::{Backend, LcsEngine, Sequence, Symbol};

/// Run every available backend over growing inputs and worker counts,
/// checking results against the classic full-table DP.
#[derive(Parser)]
#[command(name = "scale_probe")]
struct Options {
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Largest sequence length verified against the full-table baseline
    #[arg(long, default_value_t = 2048)]
    verify_limit: usize,

    /// Largest sequence length to run
    #[arg(long, default_value_t = 16384)]
    max_len: usize,

    /// Worker counts to try
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,8")]
    workers: Vec<usize>,
}

#[derive(Copy, Clone, ValueEnum)]
enum OutputFormat {
    Csv,
    Table,
}

struct Measurement {
    backend: Backend,
    len: usize,
    workers: usize,
    score: u32,
    wall_s: f64,
    rss_delta_kib: u64,
    status: VerificationStatus,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }
}

fn main() {
    let options = Options::parse();
    let mut sys = System::new();
    let mut measurements = Vec::new();

    let sizes: Vec<usize> = std::iter::successors(Some(256usize), |&n| Some(n * 2))
        .take_while(|&n| n <= options.max_len)
        .collect();

    for backend in Backend::available() {
        eprintln!("[{backend}]");
        for &len in &sizes {
            let cols = deterministic_dna(len, 0);
            let rows = deterministic_dna(len, 1);
            let baseline = (len <= options.verify_limit).then(|| {
                classic_lcs_len(cols.to_string().as_bytes(), rows.to_string().as_bytes())
            });

            for &workers in &options.workers {
                let engine = match LcsEngine::with_backend(workers, backend) {
                    Ok(engine) => engine,
                    Err(err) => {
                        eprintln!("  skipping workers={workers}: {err}");
                        continue;
                    }
                };
                let before = rss_kib(&mut sys);
                let start = Instant::now();
                let score = match engine.score(&cols, &rows) {
                    Ok(score) => score,
                    Err(err) => {
                        eprintln!("scale_probe: {backend} len={len} workers={workers}: {err}");
                        std::process::exit(1);
                    }
                };
                let wall_s = start.elapsed().as_secs_f64();
                let after = rss_kib(&mut sys);

                let status = match baseline {
                    None => VerificationStatus::NotChecked,
                    Some(b) if b == score => VerificationStatus::Passed,
                    Some(_) => VerificationStatus::Failed,
                };
                eprintln!(
                    "  len={len:<6} workers={workers:<3} lcs={score:<6} time={wall_s:.3}s status={}",
                    status.label()
                );
                measurements.push(Measurement {
                    backend,
                    len,
                    workers,
                    score,
                    wall_s,
                    rss_delta_kib: after.saturating_sub(before),
                    status,
                });
            }
        }
    }

    match options.format {
        OutputFormat::Csv => write_csv(&measurements),
        OutputFormat::Table => write_table(&measurements),
    }

    let failed = measurements
        .iter()
        .filter(|m| m.status == VerificationStatus::Failed)
        .count();
    if failed > 0 {
        eprintln!("scale_probe: {failed} run(s) disagreed with the baseline");
        std::process::exit(1);
    }
}

fn write_csv(measurements: &[Measurement]) {
    println!("backend,len,workers,lcs,wall_s,rss_delta_kib,status");
    for m in measurements {
        println!(
            "{},{},{},{},{:.3},{},{}",
            m.backend,
            m.len,
            m.workers,
            m.score,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label()
        );
    }
}

fn write_table(measurements: &[Measurement]) {
    println!(
        "{:<10}  {:>7}  {:>7}  {:>7}  {:>9}  {:>13}  {}",
        "backend", "len", "workers", "lcs", "wall_s", "rss_delta_kib", "status"
    );
    println!("{:-<72}", "");
    for m in measurements {
        println!(
            "{:<10}  {:>7}  {:>7}  {:>7}  {:>9.3}  {:>13}  {}",
            m.backend.name(),
            m.len,
            m.workers,
            m.score,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label()
        );
    }
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map(|process| process.memory() / 1024)
        .unwrap_or(0)
}

/// Deterministic pseudo-random DNA; `stream` selects an independent sequence.
fn deterministic_dna(len: usize, stream: u64) -> Sequence {
    let mut state = 0x9E37_79B9_7F4A_7C15u64 ^ stream.wrapping_mul(0xD1B5_4A32_D192_ED03);
    (0..len)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            Symbol::ALL[(state >> 62) as usize]
        })
        .collect::<Vec<_>>()
        .into()
}
