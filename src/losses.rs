use crate::sigmoid;

/// General interface for a loss.
///
/// `calc_loss` works on predictions in the response scale (a value for a regression, a
/// probability for a classification) and is the impurity of a node. The gradient and the
/// hessian are taken with respect to the latent (linear) predictor and drive the GLM solver.
pub trait Loss: Sync + Send {
    fn inverse_link(&self, latent: f64) -> f64;
    fn calc_gradient_hessian(&self, target: &[f64], latent: &[f64]) -> (Vec<f64>, Vec<f64>);
    fn calc_loss(&self, target: &[f64], predictions: &[f64]) -> f64;

    /// Whether the cross-validation folds should keep the proportion of each label.
    fn is_classification(&self) -> bool {
        false
    }
}

/// L2 Loss, ie the usual loss for a regression. The impurity is the mean squared error.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RegLoss {
    // Nothing inside
}

impl Loss for RegLoss {
    fn inverse_link(&self, latent: f64) -> f64 {
        latent
    }

    fn calc_gradient_hessian(&self, target: &[f64], latent: &[f64]) -> (Vec<f64>, Vec<f64>) {
        // Gradient of 1/2 (y - f)^2
        let hessian: Vec<f64> = (0..target.len()).map(|_| 1.).collect();
        let grad = (0..target.len()).map(|i| latent[i] - target[i]).collect();
        (grad, hessian)
    }

    fn calc_loss(&self, target: &[f64], predictions: &[f64]) -> f64 {
        assert_eq!(target.len(), predictions.len());
        let errors: f64 = target
            .iter()
            .zip(predictions)
            .map(|(&target, &prediction)| (target - prediction).powi(2))
            .sum();
        errors / (target.len() as f64)
    }
}

/// Binary log loss, for two-class classification. The impurity is the mean cross-entropy in
/// bits, so a constant prediction at the positive rate gives the binary entropy.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BinaryLogLoss {
    // Nothing inside
}

/// Lowest probability used when a prediction is confidently wrong.
static PROBA_FLOOR: f64 = 1e-12;

impl Loss for BinaryLogLoss {
    fn inverse_link(&self, latent: f64) -> f64 {
        sigmoid(latent)
    }

    fn calc_gradient_hessian(&self, target: &[f64], latent: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut hessian: Vec<f64> = Vec::with_capacity(target.len());
        let mut grad = Vec::with_capacity(target.len());
        for (&target, &latent) in target.iter().zip(latent.iter()) {
            let proba = sigmoid(latent);
            grad.push(proba - target);
            hessian.push(proba * (1. - proba));
        }
        (grad, hessian)
    }

    fn calc_loss(&self, target: &[f64], predictions: &[f64]) -> f64 {
        // -Loss = Y * log(p) + (1-Y) * log(1-p)
        assert_eq!(target.len(), predictions.len());
        let mut errors = 0.;
        for (&target, &proba) in target.iter().zip(predictions.iter()) {
            debug_assert!(
                (target == 0.) | (target == 1.),
                "Target must be 0 or 1, got {}",
                target
            );
            // The terms are skipped when their weight is 0 so an exact prediction costs exactly 0
            if target > 0. {
                errors -= target * proba.max(PROBA_FLOOR).log2();
            }
            if target < 1. {
                errors -= (1. - target) * (1. - proba).max(PROBA_FLOOR).log2();
            }
        }
        errors / (target.len() as f64)
    }

    fn is_classification(&self) -> bool {
        true
    }
}

/// Entropy in bits of a Bernoulli variable of parameter `p`. Exactly 0 for `p` = 0 or 1.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0. || p >= 1. {
        return 0.;
    }
    -p * p.log2() - (1. - p) * (1. - p).log2()
}
