//! Tree SHAP - exact path-dependent Shapley values for tree ensembles.
//!
//! Polynomial-time algorithm of Lundberg et al. ("Consistent Individualized
//! Feature Attribution for Tree Ensembles"). Conditional expectations are
//! taken over the training distribution recorded in node covers, so the model
//! artifact must carry `internal_count` / `leaf_count`.
//!
//! Output is in raw-margin (log-odds) space for the positive class and
//! satisfies local accuracy: `expected_value + Σ φ == margin`.

use std::sync::Arc;

use ndarray::ArrayView1;

use super::tree::{Node, Tree, TreeEnsemble};
use super::{check_shape, ArtifactError, Explainer, ScoreError};
use crate::logic::layout::FEATURE_COUNT;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// SHAP explainer sharing the classifier's trees
#[derive(Debug, Clone)]
pub struct TreeShapExplainer {
    ensemble: Arc<TreeEnsemble>,
    expected_value: f64,
}

impl TreeShapExplainer {
    /// Fails when a split has no positive cover
    pub fn new(ensemble: Arc<TreeEnsemble>) -> Result<Self, ArtifactError> {
        for (t, tree) in ensemble.trees().iter().enumerate() {
            for node in tree.nodes() {
                match (node, node.cover()) {
                    (Node::Split { .. }, Some(c)) if c > 0.0 => {}
                    (Node::Leaf { .. }, Some(c)) if c >= 0.0 => {}
                    _ => {
                        return Err(ArtifactError::Unsupported(format!(
                            "tree {} lacks node counts required for SHAP",
                            t
                        )))
                    }
                }
            }
        }

        let expected_value = ensemble
            .trees()
            .iter()
            .map(|tree| node_expectation(tree, 0))
            .sum::<f64>()
            / ensemble.output_divisor();

        let explainer = Self { ensemble, expected_value };
        tracing::info!("SHAP explainer ready (expected value {:.4})", explainer.expected_value());

        Ok(explainer)
    }

    /// Mean margin over the training distribution
    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn tree_shap(&self, tree: &Tree, x: &ArrayView1<'_, f64>, phi: &mut [f64]) {
        recurse(tree, 0, x, phi, Vec::with_capacity(16), 1.0, 1.0, None);
    }
}

impl Explainer for TreeShapExplainer {
    fn contributions(&self, scaled: ArrayView1<'_, f64>) -> Result<Vec<f64>, ScoreError> {
        check_shape(&scaled)?;

        let mut phi = vec![0.0; FEATURE_COUNT];
        for tree in self.ensemble.trees() {
            self.tree_shap(tree, &scaled, &mut phi);
        }

        let divisor = self.ensemble.output_divisor();
        for value in phi.iter_mut() {
            *value /= divisor;
        }

        if phi.iter().any(|v| !v.is_finite()) {
            return Err(ScoreError::NonFinite { stage: "explainer" });
        }
        Ok(phi)
    }
}

fn node_expectation(tree: &Tree, index: usize) -> f64 {
    match &tree.nodes[index] {
        Node::Leaf { value, .. } => *value,
        Node::Split { left, right, cover, .. } => {
            let total = cover.unwrap_or(1.0);
            let left_cover = tree.nodes[*left].cover().unwrap_or(0.0);
            let right_cover = tree.nodes[*right].cover().unwrap_or(0.0);
            (left_cover * node_expectation(tree, *left) + right_cover * node_expectation(tree, *right))
                / total
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    index: usize,
    x: &ArrayView1<'_, f64>,
    phi: &mut [f64],
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    match &tree.nodes[index] {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let w = unwound_path_sum(&path, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        Node::Split { feature: split, left, right, cover, .. } => {
            let hot = tree.next(index, x).unwrap_or(*left);
            let cold = if hot == *left { *right } else { *left };

            let w = cover.unwrap_or(1.0);
            let hot_zero = tree.nodes[hot].cover().unwrap_or(0.0) / w;
            let cold_zero = tree.nodes[cold].cover().unwrap_or(0.0) / w;

            // A feature split on twice is accounted for once
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = path.iter().position(|p| p.feature == Some(*split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, k);
            }

            recurse(tree, hot, x, phi, path.clone(), hot_zero * incoming_zero, incoming_one, Some(*split));
            recurse(tree, cold, x, phi, path, cold_zero * incoming_zero, 0.0, Some(*split));
        }
    }
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let d = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / d;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / d;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * d / ((i + 1) as f64 * one);
            next_one_portion = tmp - path[i].weight * zero * (depth - i) as f64 / d;
        } else {
            path[i].weight = path[i].weight * d / (zero * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = next_one_portion * d / ((i + 1) as f64 * one);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero * (depth - i) as f64 / d;
        } else if zero != 0.0 {
            total += path[i].weight / zero / ((depth - i) as f64 / d);
        }
    }

    total
}
