use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use grappe::Partition as _;
use grappe::Point2D;
use rand::SeedableRng as _;
use rand_distr::Distribution as _;

fn blobs(count: usize) -> Vec<Point2D> {
    let centers = [
        Point2D::new(-10.0, -10.0),
        Point2D::new(10.0, -10.0),
        Point2D::new(0.0, 10.0),
    ];
    let mut rng = rand_pcg::Pcg64::seed_from_u64(0);
    let normal = rand_distr::Normal::new(0.0, 3.0).unwrap();
    (0..count)
        .map(|i| {
            let center = centers[i % centers.len()];
            center + Point2D::new(normal.sample(&mut rng), normal.sample(&mut rng))
        })
        .collect()
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_means");

    for count in [1_000, 10_000, 100_000] {
        let points = blobs(count);
        let mut partition = vec![0; count];
        let mut k_means = grappe::KMeans {
            part_count: 3,
            ..Default::default()
        };
        group.bench_function(&count.to_string(), |b| {
            b.iter(|| k_means.partition(black_box(&mut partition), black_box(&points)))
        });
    }

    let points = blobs(10_000);
    group.bench_function("plot", |b| {
        b.iter(|| {
            let mut figure = grappe::Figure::new();
            grappe::plot_kmeans(&mut figure, black_box(&points), 3)
        })
    });
}

criterion_group!(benches, bench);
criterion_main!(benches);
