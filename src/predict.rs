use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::error::PredictionError;
use crate::models::{FeatureRow, FeatureValue, PredictionResult, StudentRecord};

pub trait Scorer {
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictionError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearScorer {
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LinearScorer {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let scorer: LinearScorer = serde_json::from_str(&raw)
            .with_context(|| format!("malformed model artifact {}", path.display()))?;
        debug!(
            numeric = scorer.numeric.len(),
            categorical = scorer.categorical.len(),
            "model artifact loaded"
        );
        Ok(scorer)
    }
}

impl Scorer for LinearScorer {
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictionError> {
        let mut score = self.intercept;

        for (name, coef) in &self.numeric {
            match row.get(name) {
                Some(FeatureValue::Numeric(value)) => score += coef * value,
                Some(FeatureValue::Category(_)) => {
                    return Err(PredictionError::FeatureType {
                        name: name.clone(),
                        expected: "numeric",
                    })
                }
                None => return Err(PredictionError::MissingFeature(name.clone())),
            }
        }

        for (name, levels) in &self.categorical {
            match row.get(name) {
                Some(FeatureValue::Category(level)) => {
                    let weight = levels.get(level).ok_or_else(|| PredictionError::UnknownLevel {
                        name: name.clone(),
                        level: level.clone(),
                    })?;
                    score += weight;
                }
                Some(FeatureValue::Numeric(_)) => {
                    return Err(PredictionError::FeatureType {
                        name: name.clone(),
                        expected: "categorical",
                    })
                }
                None => return Err(PredictionError::MissingFeature(name.clone())),
            }
        }

        if score.is_finite() {
            Ok(score)
        } else {
            Err(PredictionError::NonFinite)
        }
    }
}

pub fn predict(scorer: &dyn Scorer, record: &StudentRecord) -> PredictionResult {
    predict_row(scorer, &record.to_feature_row())
}

pub fn predict_row(scorer: &dyn Scorer, row: &FeatureRow) -> PredictionResult {
    let score = scorer.predict(row)?;
    debug!(score, "scorer returned");
    Ok(score)
}
