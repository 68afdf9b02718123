extern crate glmtree;
extern crate rand;
extern crate rand_chacha;

use glmtree::{rmse, ClassificationLearner, Dataset, GlmTree, RegressionLearner, TreeParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Linear in the second feature, with a different slope on each side of x0 = 0.4.
fn regression_data(n_rows: usize, seed: u64) -> Result<Dataset, Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let rows: Vec<Vec<f64>> = (0..n_rows)
        .map(|_| (0..3).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let target = rows
        .iter()
        .map(|row: &Vec<f64>| {
            let slope = if row[0] <= 0.4 { 3. } else { -2. };
            slope * row[1] + 0.2 * rng.gen::<f64>()
        })
        .collect();
    Ok(Dataset::from_rows(rows, target)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let train = regression_data(1000, 0)?;
    let test = regression_data(500, 1)?;

    for max_depth in 0..3 {
        let mut params = TreeParams::default();
        params.max_depth = max_depth;
        params.reg_lambda = vec![0.0001, 0.001, 0.01];
        params.feature_names = Some(vec!["x0".into(), "x1".into(), "x2".into()]);

        println!("\nmax_depth={}", max_depth);
        let tree = GlmTree::build(&train, &params, RegressionLearner::new())?;
        print!("{}", tree.export_text());
        println!("RMSE train {:.8}", rmse(&train.target, &tree.predict(&train.features)?));
        println!("RMSE test {:.8}", rmse(&test.target, &tree.predict(&test.features)?));
        println!("Feature importances {:?}", tree.feature_importances());
    }

    // Same structure as a probability
    let labels: Vec<f64> = train
        .target
        .iter()
        .map(|&y| if y > 0.5 { 1. } else { 0. })
        .collect();
    let binary = Dataset::new(train.features.clone(), labels)?;
    let mut params = TreeParams::default();
    params.max_depth = 1;
    let tree = GlmTree::build(&binary, &params, ClassificationLearner::new())?;
    print!("\n{}", tree.export_text());
    let predictions = tree.predict_label(&binary.features)?;
    let n_ok = predictions
        .iter()
        .zip(&binary.target)
        .filter(|(a, b)| a == b)
        .count();
    println!(
        "Accuracy train {:.4}",
        n_ok as f64 / binary.target.len() as f64
    );
    Ok(())
}
