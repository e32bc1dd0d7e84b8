//! Tree Ensemble - LightGBM binary booster evaluated natively.
//!
//! Reads the JSON produced by `Booster.dump_model()`. Only numerical splits
//! are supported; categorical models are rejected at load.

use std::path::Path;

use ndarray::ArrayView1;
use serde::Deserialize;

use super::artifact::{load_json, ArtifactInfo};
use super::{check_shape, ArtifactError, Classifier, ScoreError};
use crate::logic::layout::{names_match_layout, FEATURE_COUNT};

/// LightGBM treats |x| <= this as zero for `missing_type = Zero`
const ZERO_THRESHOLD: f64 = 1e-35;

// ============================================================================
// DUMP FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelDump {
    num_class: usize,
    #[serde(default = "default_one")]
    num_tree_per_iteration: usize,
    max_feature_idx: usize,
    objective: String,
    #[serde(default)]
    average_output: bool,
    #[serde(default)]
    feature_names: Vec<String>,
    tree_info: Vec<TreeInfo>,
}

fn default_one() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct TreeInfo {
    #[serde(default)]
    num_cat: usize,
    tree_structure: RawNode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Split(RawSplit),
    Leaf(RawLeaf),
}

#[derive(Debug, Deserialize)]
struct RawSplit {
    split_feature: usize,
    threshold: RawThreshold,
    decision_type: String,
    #[serde(default)]
    default_left: bool,
    #[serde(default)]
    missing_type: Option<String>,
    #[serde(default)]
    internal_count: Option<f64>,
    left_child: Box<RawNode>,
    right_child: Box<RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawThreshold {
    Numerical(f64),
    Categorical(String),
}

#[derive(Debug, Deserialize)]
struct RawLeaf {
    leaf_value: f64,
    #[serde(default)]
    leaf_count: Option<f64>,
}

// ============================================================================
// COMPILED TREES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingType {
    None,
    Zero,
    NaN,
}

impl MissingType {
    fn parse(raw: Option<&str>) -> Result<Self, ArtifactError> {
        match raw.unwrap_or("None") {
            "None" => Ok(Self::None),
            "Zero" => Ok(Self::Zero),
            "NaN" => Ok(Self::NaN),
            other => Err(ArtifactError::Unsupported(format!("missing_type {}", other))),
        }
    }
}

/// Flat node; children are indices into `Tree::nodes`
#[derive(Debug, Clone)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        default_left: bool,
        missing: MissingType,
        left: usize,
        right: usize,
        /// Training rows that reached this node
        cover: Option<f64>,
    },
    Leaf {
        value: f64,
        cover: Option<f64>,
    },
}

impl Node {
    pub fn cover(&self) -> Option<f64> {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

/// One regression tree, root at index 0
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: RawNode) -> Result<Self, ArtifactError> {
        let mut nodes = Vec::new();
        push_node(&mut nodes, root)?;
        Ok(Self { nodes })
    }

    /// Index of the child `x` falls into at split `index`
    pub(crate) fn next(&self, index: usize, x: &ArrayView1<'_, f64>) -> Option<usize> {
        match &self.nodes[index] {
            Node::Split { feature, threshold, default_left, missing, left, right, .. } => {
                let mut value = x[*feature];
                if *missing != MissingType::NaN && value.is_nan() {
                    value = 0.0;
                }

                let is_missing = match missing {
                    MissingType::Zero => value.abs() <= ZERO_THRESHOLD,
                    MissingType::NaN => value.is_nan(),
                    MissingType::None => false,
                };

                let go_left = if is_missing { *default_left } else { value <= *threshold };
                Some(if go_left { *left } else { *right })
            }
            Node::Leaf { .. } => None,
        }
    }

    /// Leaf value reached by `x`
    pub fn predict(&self, x: &ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        while let Some(child) = self.next(index, x) {
            index = child;
        }
        match &self.nodes[index] {
            Node::Leaf { value, .. } => *value,
            Node::Split { .. } => unreachable!("walk ends on a leaf"),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

fn push_node(nodes: &mut Vec<Node>, raw: RawNode) -> Result<usize, ArtifactError> {
    let index = nodes.len();

    match raw {
        RawNode::Leaf(leaf) => {
            nodes.push(Node::Leaf { value: leaf.leaf_value, cover: leaf.leaf_count });
        }
        RawNode::Split(split) => {
            if split.decision_type != "<=" {
                return Err(ArtifactError::Unsupported(format!(
                    "decision_type {}",
                    split.decision_type
                )));
            }
            let threshold = match split.threshold {
                RawThreshold::Numerical(t) => t,
                RawThreshold::Categorical(_) => {
                    return Err(ArtifactError::Unsupported("categorical split".to_string()))
                }
            };
            if split.split_feature >= FEATURE_COUNT {
                return Err(ArtifactError::LayoutMismatch(format!(
                    "split on feature {}",
                    split.split_feature
                )));
            }
            let missing = MissingType::parse(split.missing_type.as_deref())?;

            // Reserve the slot, fill children, then patch indices
            nodes.push(Node::Leaf { value: 0.0, cover: None });
            let left = push_node(nodes, *split.left_child)?;
            let right = push_node(nodes, *split.right_child)?;

            nodes[index] = Node::Split {
                feature: split.split_feature,
                threshold,
                default_left: split.default_left,
                missing,
                left,
                right,
                cover: split.internal_count,
            };
        }
    }

    Ok(index)
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// Gradient-boosted trees for the planet / false positive decision
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    sigmoid: f64,
    average_output: bool,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<(Self, ArtifactInfo), ArtifactError> {
        let (dump, info) = load_json::<ModelDump>(path)?;
        let ensemble = Self::from_dump(dump)?;
        tracing::info!(
            "Model loaded from {} ({} trees, sigmoid {})",
            path.display(),
            ensemble.trees.len(),
            ensemble.sigmoid
        );
        Ok((ensemble, info))
    }

    #[cfg(test)]
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let dump: ModelDump = serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
            path: "<memory>".into(),
            source,
        })?;
        Self::from_dump(dump)
    }

    fn from_dump(dump: ModelDump) -> Result<Self, ArtifactError> {
        if dump.num_class != 1 || dump.num_tree_per_iteration != 1 {
            return Err(ArtifactError::Unsupported(format!(
                "{} classes, expected a binary booster",
                dump.num_class.max(dump.num_tree_per_iteration)
            )));
        }

        let sigmoid = parse_objective(&dump.objective)?;

        if dump.max_feature_idx + 1 != FEATURE_COUNT {
            return Err(ArtifactError::LayoutMismatch(format!(
                "model expects {} features, layout has {}",
                dump.max_feature_idx + 1,
                FEATURE_COUNT
            )));
        }
        if !dump.feature_names.is_empty() && !names_match_layout(&dump.feature_names) {
            return Err(ArtifactError::LayoutMismatch(format!(
                "model was trained on columns {:?}",
                dump.feature_names
            )));
        }
        if dump.tree_info.is_empty() {
            return Err(ArtifactError::Unsupported("model has no trees".to_string()));
        }

        let trees = dump
            .tree_info
            .into_iter()
            .map(|info| {
                if info.num_cat > 0 {
                    return Err(ArtifactError::Unsupported("categorical split".to_string()));
                }
                Tree::compile(info.tree_structure)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            sigmoid,
            average_output: dump.average_output,
        })
    }

    /// Raw score before the sigmoid
    pub fn margin(&self, x: &ArrayView1<'_, f64>) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.output_divisor()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Random-forest boosters average tree outputs instead of summing
    pub fn output_divisor(&self) -> f64 {
        if self.average_output {
            self.trees.len() as f64
        } else {
            1.0
        }
    }
}

/// `"binary sigmoid:1"` → 1.0
fn parse_objective(objective: &str) -> Result<f64, ArtifactError> {
    let mut parts = objective.split_whitespace();
    if parts.next() != Some("binary") {
        return Err(ArtifactError::Unsupported(format!("objective {}", objective)));
    }

    for part in parts {
        if let Some(value) = part.strip_prefix("sigmoid:") {
            return value
                .parse::<f64>()
                .map_err(|_| ArtifactError::Unsupported(format!("objective {}", objective)));
        }
    }
    Ok(1.0)
}

impl Classifier for TreeEnsemble {
    fn predict_proba(&self, scaled: ArrayView1<'_, f64>) -> Result<[f64; 2], ScoreError> {
        check_shape(&scaled)?;

        let margin = self.margin(&scaled);
        let p_planet = 1.0 / (1.0 + (-self.sigmoid * margin).exp());
        if !p_planet.is_finite() {
            return Err(ScoreError::NonFinite { stage: "classifier" });
        }

        Ok([1.0 - p_planet, p_planet])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::Array1;
    use serde_json::json;

    /// Two trees over features 8 (snr) and 16 (fpflag_nt)
    pub(crate) fn two_tree_dump() -> serde_json::Value {
        json!({
            "name": "tree",
            "version": "v4",
            "num_class": 1,
            "num_tree_per_iteration": 1,
            "label_index": 0,
            "max_feature_idx": 19,
            "objective": "binary sigmoid:1",
            "average_output": false,
            "feature_names": crate::logic::layout::FEATURE_LAYOUT,
            "tree_info": [
                {
                    "tree_index": 0,
                    "num_leaves": 3,
                    "num_cat": 0,
                    "shrinkage": 1,
                    "tree_structure": {
                        "split_index": 0,
                        "split_feature": 8,
                        "threshold": 0.5,
                        "decision_type": "<=",
                        "default_left": true,
                        "missing_type": "None",
                        "internal_value": 0,
                        "internal_count": 100,
                        "left_child": { "leaf_index": 0, "leaf_value": -1.0, "leaf_count": 40 },
                        "right_child": {
                            "split_index": 1,
                            "split_feature": 16,
                            "threshold": 0.5,
                            "decision_type": "<=",
                            "default_left": true,
                            "missing_type": "None",
                            "internal_count": 60,
                            "left_child": { "leaf_index": 1, "leaf_value": 2.0, "leaf_count": 45 },
                            "right_child": { "leaf_index": 2, "leaf_value": -0.5, "leaf_count": 15 }
                        }
                    }
                },
                {
                    "tree_index": 1,
                    "num_leaves": 2,
                    "num_cat": 0,
                    "shrinkage": 0.1,
                    "tree_structure": {
                        "split_feature": 0,
                        "threshold": 0.25,
                        "decision_type": "<=",
                        "default_left": false,
                        "missing_type": "Zero",
                        "internal_count": 100,
                        "left_child": { "leaf_value": 0.3, "leaf_count": 30 },
                        "right_child": { "leaf_value": -0.1, "leaf_count": 70 }
                    }
                }
            ]
        })
    }

    pub(crate) fn two_tree_ensemble() -> TreeEnsemble {
        TreeEnsemble::from_json_str(&two_tree_dump().to_string()).unwrap()
    }

    pub(crate) fn vector(snr: f64, flag: f64, period: f64) -> Array1<f64> {
        let mut x = Array1::zeros(FEATURE_COUNT);
        x[8] = snr;
        x[16] = flag;
        x[0] = period;
        x
    }

    #[test]
    fn test_margin() {
        let model = two_tree_ensemble();
        assert_eq!(model.trees().len(), 2);

        // snr high, flag clear, period low
        assert!((model.margin(&vector(1.0, 0.0, -1.0).view()) - 2.3).abs() < 1e-12);
        // snr low, period high
        assert!((model.margin(&vector(0.0, 0.0, 1.0).view()) - -1.1).abs() < 1e-12);
        // flag raised
        assert!((model.margin(&vector(1.0, 1.0, 1.0).view()) - -0.6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_missing_goes_default() {
        let model = two_tree_ensemble();
        // period exactly 0 is "missing" in tree 1: default right (-0.1), not left (0.3)
        let x = vector(0.0, 0.0, 0.0);
        assert!((model.margin(&x.view()) - -1.1).abs() < 1e-12);
    }

    #[test]
    fn test_predict_proba() {
        let model = two_tree_ensemble();
        let x = vector(1.0, 0.0, -1.0);
        let [p0, p1] = model.predict_proba(x.view()).unwrap();

        let expected = 1.0 / (1.0 + (-2.3f64).exp());
        assert!((p1 - expected).abs() < 1e-12);
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(x.view()).unwrap(), 1);
        assert_eq!(model.predict(vector(0.0, 0.0, 1.0).view()).unwrap(), 0);
    }

    #[test]
    fn test_sigmoid_parameter() {
        let mut dump = two_tree_dump();
        dump["objective"] = json!("binary sigmoid:2");
        let model = TreeEnsemble::from_json_str(&dump.to_string()).unwrap();

        let [_, p1] = model.predict_proba(vector(1.0, 0.0, -1.0).view()).unwrap();
        assert!((p1 - 1.0 / (1.0 + (-4.6f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_average_output() {
        let mut dump = two_tree_dump();
        dump["average_output"] = json!(true);
        let model = TreeEnsemble::from_json_str(&dump.to_string()).unwrap();
        assert!((model.margin(&vector(1.0, 0.0, -1.0).view()) - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_shape() {
        let model = two_tree_ensemble();
        let x = Array1::zeros(3);
        assert_eq!(
            model.predict_proba(x.view()).unwrap_err(),
            ScoreError::Shape { expected: 20, actual: 3 }
        );
    }

    #[test]
    fn test_rejects_multiclass() {
        let mut dump = two_tree_dump();
        dump["num_class"] = json!(3);
        dump["objective"] = json!("multiclass num_class:3");
        let err = TreeEnsemble::from_json_str(&dump.to_string()).unwrap_err();
        assert!(matches!(err, ArtifactError::Unsupported(_)));
    }

    #[test]
    fn test_rejects_regression_objective() {
        let mut dump = two_tree_dump();
        dump["objective"] = json!("regression");
        assert!(matches!(
            TreeEnsemble::from_json_str(&dump.to_string()),
            Err(ArtifactError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_categorical() {
        let mut dump = two_tree_dump();
        dump["tree_info"][1]["tree_structure"]["decision_type"] = json!("==");
        dump["tree_info"][1]["tree_structure"]["threshold"] = json!("1||3");
        assert!(matches!(
            TreeEnsemble::from_json_str(&dump.to_string()),
            Err(ArtifactError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_layout_mismatch() {
        let mut dump = two_tree_dump();
        dump["max_feature_idx"] = json!(14);
        assert!(matches!(
            TreeEnsemble::from_json_str(&dump.to_string()),
            Err(ArtifactError::LayoutMismatch(_))
        ));

        let mut dump = two_tree_dump();
        dump["feature_names"][0] = json!("period");
        assert!(matches!(
            TreeEnsemble::from_json_str(&dump.to_string()),
            Err(ArtifactError::LayoutMismatch(_))
        ));
    }

    #[test]
    fn test_single_leaf_tree() {
        let mut dump = two_tree_dump();
        dump["tree_info"][1]["tree_structure"] = json!({ "leaf_value": 0.25 });
        let model = TreeEnsemble::from_json_str(&dump.to_string()).unwrap();
        assert!((model.margin(&vector(0.0, 0.0, 0.0).view()) - -0.75).abs() < 1e-12);
    }
}
