//! Isolation forest over a standardized metric matrix.
//!
//! Trees are grown on random subsamples with uniformly random splits until
//! a point is isolated or the depth limit `ceil(log2(sample_size))` is hit.
//! Anomalies isolate early, so short average paths score high.
//!
//! Every tree draws its own seed from one master generator before any tree
//! is built, so growing trees in parallel gives the same forest as growing
//! them one by one.

use rayon::prelude::*;

use crate::rng::SeededRng;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful BST search over `n` points;
/// the normalizer for isolation depths.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(rows: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut SeededRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(rows, sample, 0, max_depth, rng);
        tree
    }

    /// Append the subtree for `indices` and return its node id.
    fn build(
        &mut self,
        rows: &[Vec<f64>],
        indices: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut SeededRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: indices.len() });
        if indices.len() <= 1 || depth >= max_depth {
            return id;
        }

        let width = rows[indices[0]].len();
        let splittable: Vec<(usize, f64, f64)> = (0..width)
            .filter_map(|f| {
                let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    (lo.min(rows[i][f]), hi.max(rows[i][f]))
                });
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();
        if splittable.is_empty() {
            return id;
        }

        let (feature, lo, hi) = splittable[rng.index(splittable.len())];
        let threshold = rng.uniform(lo, hi);
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| rows[i][feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            return id;
        }

        let left = self.build(rows, left, depth + 1, max_depth, rng);
        let right = self.build(rows, right, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Isolation depth of `point`, adjusted for the unresolved leaf size.
    fn path_length(&self, point: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if point[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// A fitted isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Grow `n_estimators` trees over row-major `rows`, each on a subsample
    /// of `min(max_samples, rows)` distinct rows.
    pub fn fit(rows: &[Vec<f64>], n_estimators: usize, max_samples: usize, seed: u64) -> Self {
        let sample_size = max_samples.min(rows.len());
        if sample_size == 0 {
            return Self {
                trees: Vec::new(),
                sample_size,
            };
        }
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let mut master = SeededRng::new(seed);
        let tree_seeds: Vec<u64> = (0..n_estimators.max(1)).map(|_| master.next_u64()).collect();

        let trees = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = SeededRng::new(tree_seed);
                let sample = rng.sample_indices(rows.len(), sample_size);
                IsolationTree::grow(rows, sample, max_depth, &mut rng)
            })
            .collect();

        Self { trees, sample_size }
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw anomaly scores in `[-1, 0)`; lower is more anomalous.
    pub fn score_samples(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        let norm = average_path_length(self.sample_size);
        rows.iter()
            .map(|row| {
                if self.trees.is_empty() || norm <= 0.0 {
                    return -0.5;
                }
                let mean_depth = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
                    / self.trees.len() as f64;
                -(2f64.powf(-mean_depth / norm))
            })
            .collect()
    }
}

/// Linear-interpolated percentile, `q` in `0..=100`.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Shift raw scores so that the `contamination` fraction falls below 0.
/// Negative decision values are outliers.
pub fn decision_function(scores: &[f64], contamination: f64) -> Vec<f64> {
    let offset = percentile(scores, contamination * 100.0);
    scores.iter().map(|s| s - offset).collect()
}

/// Standardize column-major data to zero mean and unit population
/// variance, returning row-major rows. Constant columns are only centred.
pub fn standardize(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let rows = columns.first().map_or(0, Vec::len);
    let mut out = vec![Vec::with_capacity(columns.len()); rows];
    for column in columns {
        let n = column.len().max(1) as f64;
        let mean = column.iter().sum::<f64>() / n;
        let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let scale = if var > 0.0 { var.sqrt() } else { 1.0 };
        for (row, v) in out.iter_mut().zip(column) {
            row.push((v - mean) / scale);
        }
    }
    out
}
