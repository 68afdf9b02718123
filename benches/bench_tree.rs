extern crate glmtree;
extern crate rand;
extern crate rand_chacha;

#[macro_use]
extern crate criterion;
#[macro_use]
extern crate lazy_static;

use criterion::{BenchmarkId, Criterion};
use glmtree::{
    ClassificationLearner, Dataset, GlmTree, RegressionLearner, TreeParams,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

lazy_static! {
    /// Piecewise linear target on 5 features, 1000 rows.
    static ref REGRESSION: Dataset = {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let rows: Vec<Vec<f64>> = (0..1000)
            .map(|_| (0..5).map(|_| rng.gen::<f64>()).collect())
            .collect();
        let target = rows
            .iter()
            .map(|row| {
                let jump = if row[0] > 0.3 { 3. } else { 0. };
                row[1] - 2. * row[2] + jump + 0.1 * rng.gen::<f64>()
            })
            .collect();
        Dataset::from_rows(rows, target).expect("regression data")
    };
    static ref CLASSIFICATION: Dataset = {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rows: Vec<Vec<f64>> = (0..1000)
            .map(|_| (0..5).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();
        let target = rows
            .iter()
            .map(|row: &Vec<f64>| {
                let latent = if row[0] <= 0. { 3. * row[1] } else { -3. * row[2] };
                if rng.gen::<f64>() < 1. / (1. + (-latent).exp()) {
                    1.
                } else {
                    0.
                }
            })
            .collect();
        Dataset::from_rows(rows, target).expect("classification data")
    };
}

fn params(max_depth: usize) -> TreeParams {
    let mut params = TreeParams::default();
    params.max_depth = max_depth;
    params.reg_lambda = vec![0.001, 0.01];
    params.n_feature_search = 2;
    params
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("glm_tree");
    group.sample_size(10);
    for max_depth in [1, 2].iter() {
        group.bench_with_input(
            BenchmarkId::new("regression", max_depth),
            max_depth,
            |b, &max_depth| {
                let params = params(max_depth);
                b.iter(|| GlmTree::build(&REGRESSION, &params, RegressionLearner::new()))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("classification", max_depth),
            max_depth,
            |b, &max_depth| {
                let params = params(max_depth);
                b.iter(|| GlmTree::build(&CLASSIFICATION, &params, ClassificationLearner::new()))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
