use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use par_lcs::{Backend, LcsEngine, Sequence, Symbol};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_dna(rng: &mut StdRng, len: usize) -> Sequence {
    (0..len)
        .map(|_| Symbol::ALL[rng.gen_range(0..Symbol::ALL.len())])
        .collect::<Vec<_>>()
        .into()
}

fn bench_worker_scaling(c: &mut Criterion) {
    const LEN: usize = 8_192;
    let mut rng = StdRng::seed_from_u64(7);
    let s = random_dna(&mut rng, LEN);
    let t = random_dna(&mut rng, LEN);

    for backend in Backend::available() {
        let mut group = c.benchmark_group(format!("worker_scaling_{backend}"));
        group.sample_size(10);
        for workers in [1usize, 2, 4, 8] {
            let engine = LcsEngine::with_backend(workers, backend).unwrap();
            group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
                b.iter(|| engine.score(&s, &t).unwrap())
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_worker_scaling);
criterion_main!(benches);
