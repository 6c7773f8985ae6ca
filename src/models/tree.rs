//! Regression tree shared by the bagged and boosted ensembles.
//!
//! Splits minimize the summed squared error of the two children. Candidate
//! thresholds are midpoints between distinct sorted values, thinned to a
//! fixed number per feature to bound fit time on long histories.

#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_thresholds: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit on the given sample rows, considering only `features` for splits.
    /// Row and feature subsets are how the ensembles inject their
    /// randomness; the tree itself is deterministic.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        rows: &[usize],
        features: &[usize],
        config: &TreeConfig,
    ) -> RegressionTree {
        RegressionTree {
            root: build_node(x, y, rows, features, config, 0),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    features: &[usize],
    config: &TreeConfig,
    depth: usize,
) -> Node {
    if depth >= config.max_depth || rows.len() < config.min_samples_split {
        return Node::Leaf(mean(y, rows));
    }
    let Some((feature, threshold)) = best_split(x, y, rows, features, config) else {
        return Node::Leaf(mean(y, rows));
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&row| x[row][feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(x, y, &left_rows, features, config, depth + 1)),
        right: Box::new(build_node(x, y, &right_rows, features, config, depth + 1)),
    }
}

fn mean(y: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&row| y[row]).sum::<f64>() / rows.len() as f64
}

/// The (feature, threshold) pair with the lowest child SSE, or `None` when
/// no split separates the rows.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    features: &[usize],
    config: &TreeConfig,
) -> Option<(usize, f64)> {
    let parent_sse = sse(y, rows);
    let mut best: Option<(f64, usize, f64)> = None;

    for &feature in features {
        for threshold in candidate_thresholds(x, rows, feature, config.max_thresholds) {
            let mut left = Vec::new();
            let mut right = Vec::new();
            for &row in rows {
                if x[row][feature] <= threshold {
                    left.push(row);
                } else {
                    right.push(row);
                }
            }
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let score = sse(y, &left) + sse(y, &right);
            if best.as_ref().map_or(score < parent_sse, |(b, _, _)| score < *b) {
                best = Some((score, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

fn sse(y: &[f64], rows: &[usize]) -> f64 {
    let m = mean(y, rows);
    rows.iter().map(|&row| (y[row] - m).powi(2)).sum()
}

fn candidate_thresholds(
    x: &[Vec<f64>],
    rows: &[usize],
    feature: usize,
    max_thresholds: usize,
) -> Vec<f64> {
    let mut values: Vec<f64> = rows.iter().map(|&row| x[row][feature]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    if values.len() < 2 {
        return Vec::new();
    }

    let midpoints: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    if midpoints.len() <= max_thresholds {
        return midpoints;
    }
    // Thin evenly, keeping the spread of the distribution.
    let step = midpoints.len() as f64 / max_thresholds as f64;
    (0..max_thresholds)
        .map(|i| midpoints[(i as f64 * step) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TreeConfig {
        TreeConfig {
            max_depth: 4,
            min_samples_split: 2,
            max_thresholds: 16,
        }
    }

    #[test]
    fn splits_a_step_function_exactly() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let rows: Vec<usize> = (0..10).collect();

        let tree = RegressionTree::fit(&x, &y, &rows, &[0], &config());
        assert_eq!(tree.predict_row(&[2.0]), 1.0);
        assert_eq!(tree.predict_row(&[7.0]), 9.0);
    }

    #[test]
    fn constant_targets_collapse_to_a_leaf() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let y = vec![4.0; 6];
        let rows: Vec<usize> = (0..6).collect();

        let tree = RegressionTree::fit(&x, &y, &rows, &[0], &config());
        assert_eq!(tree.predict_row(&[0.0]), 4.0);
        assert_eq!(tree.predict_row(&[100.0]), 4.0);
    }

    #[test]
    fn depth_limit_is_respected() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let rows: Vec<usize> = (0..32).collect();
        let shallow = TreeConfig {
            max_depth: 1,
            min_samples_split: 2,
            max_thresholds: 64,
        };

        let tree = RegressionTree::fit(&x, &y, &rows, &[0], &shallow);
        // A depth-1 tree has at most two distinct outputs.
        let mut outputs: Vec<f64> = (0..32).map(|i| tree.predict_row(&[i as f64])).collect();
        outputs.sort_by(|a, b| a.total_cmp(b));
        outputs.dedup();
        assert!(outputs.len() <= 2);
    }

    #[test]
    fn ignores_features_outside_the_subset() {
        // Feature 1 perfectly predicts y but is not offered.
        let x = vec![
            vec![1.0, 0.0],
            vec![1.0, 10.0],
            vec![1.0, 0.0],
            vec![1.0, 10.0],
        ];
        let y = vec![0.0, 10.0, 0.0, 10.0];
        let rows: Vec<usize> = (0..4).collect();

        let tree = RegressionTree::fit(&x, &y, &rows, &[0], &config());
        assert_eq!(tree.predict_row(&[1.0, 10.0]), 5.0);
    }
}
