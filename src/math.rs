use ordered_float::OrderedFloat;

pub fn sum(v: &[f64]) -> f64 {
    let mut o = 0.;
    for e in v.iter() {
        o += *e;
    }
    o
}

pub fn mean(v: &[f64]) -> f64 {
    sum(&v) / (v.len() as f64)
}

pub fn rmse(target: &[f64], yhat: &[f64]) -> f64 {
    let rmse: f64 = yhat
        .iter()
        .zip(target.iter())
        .map(|(&a, &b)| (a - b).powi(2))
        .sum();
    (rmse / target.len() as f64).sqrt()
}

/// Mean and (population) standard deviation.
pub fn mean_std(v: &[f64]) -> (f64, f64) {
    let m = mean(v);
    let var = v.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (v.len() as f64);
    (m, var.sqrt())
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&a, &b)| a * b).sum()
}

/// Numerically stable logistic function.
pub fn sigmoid(latent: f64) -> f64 {
    if latent >= 0. {
        1. / (1. + (-latent).exp())
    } else {
        let e = latent.exp();
        e / (1. + e)
    }
}

/// Proximal operator of the L1 norm.
pub(crate) fn soft_threshold(x: f64, lambda: f64) -> f64 {
    if x > lambda {
        x - lambda
    } else if x < -lambda {
        x + lambda
    } else {
        0.
    }
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `sorted` must be sorted and non empty, `level` in [0, 1].
pub(crate) fn quantile_sorted(sorted: &[f64], level: f64) -> f64 {
    assert!(!sorted.is_empty());
    let pos = level * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + frac * (sorted[upper] - sorted[lower])
    }
}

pub(crate) fn sorted_copy(v: &[f64]) -> Vec<f64> {
    let mut sorted = v.to_vec();
    sorted.sort_by_key(|&x| OrderedFloat(x));
    sorted
}
