use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use par_lcs::{Backend, LcsEngine, Sequence, Symbol};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn random_dna(rng: &mut StdRng, len: usize) -> Sequence {
    (0..len)
        .map(|_| Symbol::ALL[rng.gen_range(0..Symbol::ALL.len())])
        .collect::<Vec<_>>()
        .into()
}

fn rss_kib() -> u64 {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map(|p| p.memory() / 1024)
        .unwrap_or(0)
}

fn bench_lcs_perf(c: &mut Criterion) {
    let workers = par_lcs::utils::default_workers().min(8);
    for backend in Backend::available() {
        let mut group = c.benchmark_group(format!("lcs_perf_{backend}"));
        group.sample_size(10);
        for &len in &[1_000usize, 5_000, 10_000] {
            let engine = LcsEngine::with_backend(workers, backend).unwrap();
            group.bench_function(format!("lcs_len_{len}"), |b| {
                b.iter_batched(
                    || {
                        let mut rng = StdRng::seed_from_u64(42);
                        let s = random_dna(&mut rng, len);
                        let t = random_dna(&mut rng, len);
                        (s, t)
                    },
                    |(s, t)| {
                        let before = rss_kib();
                        let score = engine.score(&s, &t).unwrap();
                        let after = rss_kib();
                        criterion::black_box(score);
                        // record memory delta to stderr to avoid criterion noise
                        eprintln!(
                            "RSS KiB delta ({backend} {len}): {}",
                            after.saturating_sub(before)
                        );
                    },
                    BatchSize::PerIteration,
                )
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_lcs_perf);
criterion_main!(benches);
