//! Classifier artifact
//!
//! The fitted classifier is exported as JSON with a `kind` tag. The tag
//! decides, once at load time, which capability the classifier has:
//!
//! | kind                  | variant         | predict | probabilities | decision scores |
//! |-----------------------|-----------------|---------|---------------|-----------------|
//! | `logistic_regression` | `Probabilistic` | yes     | yes           | yes             |
//! | `linear_svc`          | `ScoreOnly`     | yes     | no            | yes             |
//! | `nearest_centroid`    | `Plain`         | yes     | no            | no              |

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Deserialize;

use crate::error::{ArtifactError, InferenceError};

/// On-disk classifier layout
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierFile {
    LinearSvc {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    LogisticRegression {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    NearestCentroid {
        classes: Vec<i64>,
        centroids: Vec<Vec<f64>>,
    },
}

/// Loaded classifier, tagged by what it can produce besides a class
#[derive(Debug, Clone)]
pub enum Classifier {
    /// Class probabilities available (and decision scores, which are never used)
    Probabilistic(LinearModel),
    /// Raw decision scores only
    ScoreOnly(LinearModel),
    /// Class prediction only
    Plain(NearestCentroid),
}

/// Decision-function output for a batch of rows
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionScores {
    /// Two-class model: one signed score per row
    Binary(Array1<f64>),
    /// One score per class per row
    Multiclass(Array2<f64>),
}

/// Linear decision function `x · coefᵀ + intercept`
#[derive(Debug, Clone)]
pub struct LinearModel {
    classes: Vec<i64>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

/// Nearest-centroid classifier (Euclidean)
#[derive(Debug, Clone)]
pub struct NearestCentroid {
    classes: Vec<i64>,
    centroids: Array2<f64>,
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::Probabilistic(_) => "LogisticRegression",
            Classifier::ScoreOnly(_) => "LinearSVC",
            Classifier::Plain(_) => "NearestCentroid",
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Classifier::Probabilistic(m) | Classifier::ScoreOnly(m) => &m.classes,
            Classifier::Plain(m) => &m.classes,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Probabilistic(m) | Classifier::ScoreOnly(m) => m.coef.ncols(),
            Classifier::Plain(m) => m.centroids.ncols(),
        }
    }

    /// Predicted class for every row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>, InferenceError> {
        match self {
            Classifier::Probabilistic(m) | Classifier::ScoreOnly(m) => m.predict(x),
            Classifier::Plain(m) => m.predict(x),
        }
    }
}

impl TryFrom<ClassifierFile> for Classifier {
    type Error = ArtifactError;

    fn try_from(file: ClassifierFile) -> Result<Self, Self::Error> {
        match file {
            ClassifierFile::LinearSvc { classes, coef, intercept } => {
                LinearModel::new(classes, coef, intercept).map(Classifier::ScoreOnly)
            }
            ClassifierFile::LogisticRegression { classes, coef, intercept } => {
                LinearModel::new(classes, coef, intercept).map(Classifier::Probabilistic)
            }
            ClassifierFile::NearestCentroid { classes, centroids } => {
                NearestCentroid::new(classes, centroids).map(Classifier::Plain)
            }
        }
    }
}

impl LinearModel {
    pub fn new(
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, ArtifactError> {
        if classes.len() < 2 {
            return Err(ArtifactError::Invalid(format!(
                "linear model needs at least 2 classes, got {}",
                classes.len()
            )));
        }

        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if coef.len() != expected_rows {
            return Err(ArtifactError::Invalid(format!(
                "{} classes need {} coefficient rows, got {}",
                classes.len(),
                expected_rows,
                coef.len()
            )));
        }
        if intercept.len() != expected_rows {
            return Err(ArtifactError::Invalid(format!(
                "{} coefficient rows but {} intercepts",
                expected_rows,
                intercept.len()
            )));
        }

        Ok(Self {
            classes,
            coef: to_matrix("coef", coef)?,
            intercept: Array1::from(intercept),
        })
    }

    fn is_binary(&self) -> bool {
        self.coef.nrows() == 1
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<(), InferenceError> {
        if x.ncols() != self.coef.ncols() {
            return Err(InferenceError::FeatureWidth {
                expected: self.coef.ncols(),
                got: x.ncols(),
                component: "the classifier",
            });
        }
        Ok(())
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> Result<DecisionScores, InferenceError> {
        self.check_width(x)?;
        let scores = x.dot(&self.coef.t()) + &self.intercept;

        if self.is_binary() {
            Ok(DecisionScores::Binary(scores.column(0).to_owned()))
        } else {
            Ok(DecisionScores::Multiclass(scores))
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>, InferenceError> {
        let predicted = match self.decision_function(x)? {
            DecisionScores::Binary(scores) => scores
                .iter()
                .map(|&s| self.classes[usize::from(s > 0.0)])
                .collect(),
            DecisionScores::Multiclass(scores) => scores
                .axis_iter(Axis(0))
                .map(|row| self.classes[argmax(row)])
                .collect(),
        };
        Ok(predicted)
    }

    /// Class probabilities, one row per sample, columns ordered like `classes`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        match self.decision_function(x)? {
            DecisionScores::Binary(scores) => {
                let mut proba = Array2::zeros((scores.len(), 2));
                for (mut row, &s) in proba.axis_iter_mut(Axis(0)).zip(scores.iter()) {
                    let p = sigmoid(s);
                    row[0] = 1.0 - p;
                    row[1] = p;
                }
                Ok(proba)
            }
            DecisionScores::Multiclass(mut scores) => {
                for mut row in scores.axis_iter_mut(Axis(0)) {
                    let normalized = softmax(row.view());
                    row.assign(&normalized);
                }
                Ok(scores)
            }
        }
    }
}

impl NearestCentroid {
    pub fn new(classes: Vec<i64>, centroids: Vec<Vec<f64>>) -> Result<Self, ArtifactError> {
        if classes.is_empty() {
            return Err(ArtifactError::Invalid("nearest centroid has no classes".to_string()));
        }
        if centroids.len() != classes.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} classes but {} centroids",
                classes.len(),
                centroids.len()
            )));
        }

        Ok(Self {
            classes,
            centroids: to_matrix("centroids", centroids)?,
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>, InferenceError> {
        if x.ncols() != self.centroids.ncols() {
            return Err(InferenceError::FeatureWidth {
                expected: self.centroids.ncols(),
                got: x.ncols(),
                component: "the classifier",
            });
        }

        let predicted = x
            .axis_iter(Axis(0))
            .map(|row| {
                let distances: Array1<f64> = self
                    .centroids
                    .axis_iter(Axis(0))
                    .map(|c| (&c - &row).mapv(|d| d * d).sum())
                    .collect();
                self.classes[argmin(distances.view())]
            })
            .collect();
        Ok(predicted)
    }
}

/// Numerically stable softmax: shift by the max before exponentiating.
pub fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
    let exp = scores.mapv(|s| (s - max).exp());
    let sum = exp.sum();
    exp / sum
}

fn sigmoid(s: f64) -> f64 {
    1.0 / (1.0 + (-s).exp())
}

/// Index of the first maximum.
fn argmax(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Index of the first minimum.
fn argmin(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v < values[best] {
            best = i;
        }
    }
    best
}

fn to_matrix(name: &str, rows: Vec<Vec<f64>>) -> Result<Array2<f64>, ArtifactError> {
    let n_rows = rows.len();
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(ArtifactError::Invalid(format!("{} rows are empty", name)));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(ArtifactError::Invalid(format!(
            "{} row {} has {} values, expected {}",
            name,
            i,
            row.len(),
            width
        )));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, width), flat)
        .map_err(|e| ArtifactError::Invalid(format!("{}: {}", name, e)))
}
