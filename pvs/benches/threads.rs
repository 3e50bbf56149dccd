use criterion::*;
use pvs::synth::grid_level;
use pvs::{BuildConfig, NullProgress, PvsInfo, build_portal_graph};

fn bench_grid(b: &mut Bencher, threads: &usize) {
    let mut nfo = PvsInfo::from_level(&grid_level(36, 36)).unwrap();
    let config = BuildConfig::batch().with_threads(*threads);
    b.iter(|| {
        nfo.clear_results();
        build_portal_graph(&nfo, &config, &mut NullProgress).unwrap()
    });
}

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rough PVS 36x36 grid");
    group.sample_size(20);
    for threads in [1usize, 8] {
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, bench_grid);
    }
    group.finish();
}

criterion_group!(benches, bench,);
criterion_main!(benches);
