//! Random-forest regression
//!
//! An ensemble of variance-reduction regression trees grown on bootstrap
//! samples of the training split. Every random draw flows from the
//! explicit seed in the configuration: the train/test split uses it
//! directly and each tree derives its own RNG from it, so a fit is
//! reproducible regardless of how the trees are scheduled across threads.

use super::split::train_test_split;
use super::{feature_matrix, target_vector};
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// Forest fitting configuration; every knob is explicit
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Base seed for the split and all bootstrap draws
    pub seed: u64,
    pub test_fraction: f64,
    pub max_depth: Option<usize>,
    /// Minimum node size eligible for splitting
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Array-backed tree node: internal nodes route on feature/threshold,
/// leaves carry the prediction
#[derive(Debug, Clone, Serialize)]
struct TreeNode {
    feature: usize,
    threshold: f64,
    left: usize,
    right: usize,
    prediction: f64,
    is_leaf: bool,
}

/// One regression tree of the ensemble
#[derive(Debug, Clone, Serialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict_row(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf {
                return node.prediction;
            }
            idx = if features[node.feature] <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
    }
}

/// A fitted forest
#[derive(Debug, Clone, Serialize)]
pub struct RandomForestModel {
    trees: Vec<RegressionTree>,
    pub n_features: usize,
}

impl RandomForestModel {
    /// Mean prediction across all trees for one row.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        total / self.trees.len() as f64
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Result of a forest fit on an 80/20-style split
#[derive(Debug, Clone, Serialize)]
pub struct ForestFit {
    pub model: RandomForestModel,
    /// Held-out feature rows
    pub test_features: Vec<Vec<f64>>,
    /// Held-out targets, aligned with `test_features`
    pub test_targets: Vec<f64>,
    /// Model predictions on the held-out rows
    pub predictions: Vec<f64>,
    /// Mean impurity decrease per feature, in feature-list order,
    /// normalized to sum to one
    pub importances: Vec<f64>,
}

/// Fit a random forest of `target` on `features`, evaluating on the
/// held-out fraction of the dataset.
pub fn fit_random_forest(
    dataset: &Dataset,
    features: &[&str],
    target: &str,
    config: &ForestConfig,
) -> Result<ForestFit> {
    if config.n_trees == 0 {
        return Err(AnalyticsError::Statistics(
            "forest needs at least one tree".to_string(),
        ));
    }

    let x = feature_matrix(dataset, features)?;
    let y = target_vector(dataset, target)?;
    let n_features = features.len();

    let (train_idx, test_idx) = train_test_split(y.len(), config.test_fraction, config.seed)?;

    let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let train_y: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let test_features: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
    let test_targets: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    // Each tree seeds its own RNG from the base seed and its index, so the
    // parallel iteration order cannot change the result
    let grown: Vec<(RegressionTree, Vec<f64>)> = (0..config.n_trees)
        .into_par_iter()
        .map(|tree_idx| {
            let mut rng = StdRng::seed_from_u64(
                config.seed.wrapping_add(tree_idx as u64).wrapping_add(1),
            );
            grow_tree(&train_x, &train_y, n_features, config, &mut rng)
        })
        .collect();

    let mut importances = vec![0.0f64; n_features];
    let mut trees = Vec::with_capacity(config.n_trees);
    for (tree, tree_importance) in grown {
        let total: f64 = tree_importance.iter().sum();
        if total > 0.0 {
            for (acc, imp) in importances.iter_mut().zip(&tree_importance) {
                *acc += imp / total;
            }
        }
        trees.push(tree);
    }
    let total: f64 = importances.iter().sum();
    if total > 0.0 {
        for imp in &mut importances {
            *imp /= total;
        }
    }

    let model = RandomForestModel { trees, n_features };
    let predictions = model.predict(&test_features);
    info!(
        "fitted {} trees on {} rows, holding out {}",
        config.n_trees,
        train_y.len(),
        test_targets.len()
    );

    Ok(ForestFit {
        model,
        test_features,
        test_targets,
        predictions,
        importances,
    })
}

/// Grow one tree on a bootstrap sample; returns the tree and its raw
/// impurity-decrease tally per feature.
fn grow_tree(
    x: &[Vec<f64>],
    y: &[f64],
    n_features: usize,
    config: &ForestConfig,
    rng: &mut StdRng,
) -> (RegressionTree, Vec<f64>) {
    let n = y.len();
    let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    let mut nodes = Vec::new();
    let mut importances = vec![0.0f64; n_features];
    build_node(x, y, &sample, 0, config, &mut nodes, &mut importances);
    (RegressionTree { nodes }, importances)
}

/// Sum of squared deviations from the mean, from running sums.
fn node_sse(sum: f64, sum_sq: f64, count: f64) -> f64 {
    (sum_sq - sum * sum / count).max(0.0)
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    depth: usize,
    config: &ForestConfig,
    nodes: &mut Vec<TreeNode>,
    importances: &mut [f64],
) -> usize {
    let count = rows.len() as f64;
    let sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let sum_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let sse = node_sse(sum, sum_sq, count);
    let prediction = sum / count;

    let node_idx = nodes.len();
    nodes.push(TreeNode {
        feature: 0,
        threshold: 0.0,
        left: 0,
        right: 0,
        prediction,
        is_leaf: true,
    });

    let depth_reached = config.max_depth.is_some_and(|d| depth >= d);
    if rows.len() < config.min_samples_split || sse == 0.0 || depth_reached {
        return node_idx;
    }

    let Some(split) = best_split(x, y, rows, sse) else {
        return node_idx;
    };

    importances[split.feature] += split.decrease;

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&r| x[r][split.feature] <= split.threshold);

    let left = build_node(x, y, &left_rows, depth + 1, config, nodes, importances);
    let right = build_node(x, y, &right_rows, depth + 1, config, nodes, importances);

    let node = &mut nodes[node_idx];
    node.feature = split.feature;
    node.threshold = split.threshold;
    node.left = left;
    node.right = right;
    node.is_leaf = false;

    node_idx
}

struct Split {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Best variance-reduction split over all features, or `None` when every
/// feature is constant within the node.
fn best_split(x: &[Vec<f64>], y: &[f64], rows: &[usize], parent_sse: f64) -> Option<Split> {
    let n_features = x.first().map(Vec::len).unwrap_or(0);
    let mut best: Option<Split> = None;

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> = rows.iter().map(|&r| (x[r][feature], y[r])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total: f64 = pairs.iter().map(|(_, t)| t).sum();
        let total_sq: f64 = pairs.iter().map(|(_, t)| t * t).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..pairs.len() - 1 {
            left_sum += pairs[i].1;
            left_sq += pairs[i].1 * pairs[i].1;

            // only between distinct feature values
            if pairs[i].0 == pairs[i + 1].0 {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = (pairs.len() - i - 1) as f64;
            let children_sse = node_sse(left_sum, left_sq, left_n)
                + node_sse(total - left_sum, total_sq - left_sq, right_n);
            let decrease = parent_sse - children_sse;

            if decrease > best.as_ref().map(|b| b.decrease).unwrap_or(0.0) {
                best = Some(Split {
                    feature,
                    threshold: (pairs[i].0 + pairs[i + 1].0) / 2.0,
                    decrease,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};
    use approx::assert_relative_eq;

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Float(v)).collect()
    }

    fn line_dataset(n: usize) -> Dataset {
        let xs: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x).collect();
        Dataset::new(vec![
            Column::new("x", floats(&xs)),
            Column::new("y", floats(&ys)),
        ])
        .unwrap()
    }

    #[test]
    fn test_holdout_lengths_match() {
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        let fit = fit_random_forest(&line_dataset(5), &["x"], "y", &config).unwrap();
        assert_eq!(fit.test_targets.len(), 1);
        assert_eq!(fit.predictions.len(), fit.test_targets.len());
        assert_eq!(fit.test_features.len(), fit.test_targets.len());
    }

    #[test]
    fn test_importances_shape() {
        let xs: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let noise: Vec<f64> = xs.iter().map(|x| (x * 7.0) % 3.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x).collect();
        let ds = Dataset::new(vec![
            Column::new("x1", floats(&xs)),
            Column::new("x2", floats(&noise)),
            Column::new("y", floats(&ys)),
        ])
        .unwrap();

        let config = ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        };
        let fit = fit_random_forest(&ds, &["x1", "x2"], "y", &config).unwrap();

        assert_eq!(fit.importances.len(), 2);
        assert!(fit.importances.iter().all(|&v| v >= 0.0));
        assert_relative_eq!(fit.importances.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        // the informative feature dominates
        assert!(fit.importances[0] > fit.importances[1]);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let ds = line_dataset(30);
        let config = ForestConfig {
            n_trees: 15,
            seed: 7,
            ..ForestConfig::default()
        };
        let a = fit_random_forest(&ds, &["x"], "y", &config).unwrap();
        let b = fit_random_forest(&ds, &["x"], "y", &config).unwrap();
        assert_eq!(a.predictions, b.predictions);
        assert_eq!(a.importances, b.importances);
    }

    #[test]
    fn test_predictions_track_target() {
        let ds = line_dataset(40);
        let fit = fit_random_forest(&ds, &["x"], "y", &ForestConfig::default()).unwrap();
        for (pred, target) in fit.predictions.iter().zip(&fit.test_targets) {
            // a forest on clean y = 2x lands near the truth; the widest
            // misses come from extrapolating past the training range
            assert!((pred - target).abs() < 16.0, "pred {pred} vs {target}");
        }
    }

    #[test]
    fn test_zero_trees_rejected() {
        let config = ForestConfig {
            n_trees: 0,
            ..ForestConfig::default()
        };
        assert!(fit_random_forest(&line_dataset(10), &["x"], "y", &config).is_err());
    }
}
