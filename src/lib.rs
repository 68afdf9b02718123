//! Model trees: a binary recursive partition of the feature space where every leaf holds a
//! locally fit generalized linear model instead of a constant.
//!
//! The tree is grown by actually fitting the competing child models of every candidate
//! split. Features are first screened on a coarse threshold grid, then the surviving ones
//! are searched on a finer grid.

extern crate either;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate ord_subset;
extern crate ordered_float;
extern crate rand;
extern crate rand_chacha;
extern crate rayon;
#[macro_use]
extern crate serde_derive;

mod data;
mod error;
mod glm;
mod learner;
mod losses;
mod math;
mod matrix;
mod params;
mod split;
mod tree;

pub use crate::data::*;
pub use crate::error::*;
pub use crate::glm::*;
pub use crate::learner::*;
pub use crate::losses::*;
pub use crate::math::*;
pub use crate::matrix::*;
pub use crate::params::*;
pub use crate::tree::*;

pub(crate) static DEFAULT_MAX_DEPTH: usize = 2;
pub(crate) static DEFAULT_MIN_SAMPLES_LEAF: usize = 10;
pub(crate) static DEFAULT_MIN_IMPURITY_DECREASE: f64 = 0.;
pub(crate) static DEFAULT_N_SCREEN_GRID: usize = 5;
pub(crate) static DEFAULT_N_FEATURE_SEARCH: usize = 5;
pub(crate) static DEFAULT_N_SPLIT_GRID: usize = 20;
pub(crate) static DEFAULT_N_FOLDS: usize = 5;
pub(crate) static DEFAULT_MAX_ITER: usize = 1000;
pub(crate) static DEFAULT_MAX_INNER_ITER: usize = 100;
pub(crate) static DEFAULT_TOL: f64 = 1e-6;

/// Minimum number of samples of each class before a classification leaf gets a real model.
pub static MIN_CLASS_COUNT: usize = 5;

/// Added to the standard deviation when standardizing, so constant columns don't divide by 0.
pub static EPSILON: f64 = 1e-7;

/// Probability above which a classifier predicts the positive class.
pub static DEFAULT_DECISION_THRESHOLD: f64 = 0.5;
