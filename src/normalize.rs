use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::errors::{LeafError, Result};
use crate::infer::RawPrediction;
use crate::knowledge::{DiseaseRecord, Severity};

/// Client-facing diagnosis record, serialized as the web front end expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisResult {
    pub name: String,
    pub confidence: f64,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub recommendations: Vec<String>,
    pub all_probabilities: BTreeMap<String, f64>,
}

impl DiagnosisResult {
    /// Well-defined substitute when a raw prediction cannot be normalized.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            confidence: 0.0,
            severity: None,
            description: None,
            recommendations: Vec::new(),
            all_probabilities: BTreeMap::new(),
        }
    }
}

/// Maps a raw prediction onto the knowledge base, scaling confidence and
/// every probability from the unit interval to percentages. A predicted
/// label missing from the knowledge base keeps the result but leaves
/// severity and description unset.
pub fn normalize(
    raw: &RawPrediction,
    kb: &HashMap<String, DiseaseRecord>,
) -> Result<DiagnosisResult> {
    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(LeafError::Normalization {
            reason: format!("confidence {} is outside the unit interval", raw.confidence),
        });
    }
    if let Some(labels) = raw.labels.as_ref() {
        if labels.len() != raw.probabilities.len() {
            return Err(LeafError::Normalization {
                reason: format!(
                    "{} labels for {} probabilities",
                    labels.len(),
                    raw.probabilities.len()
                ),
            });
        }
    }

    let record = kb.get(&raw.label);
    let all_probabilities = raw
        .labels
        .as_ref()
        .map(|labels| {
            labels
                .iter()
                .zip(&raw.probabilities)
                .map(|(label, p)| (label.clone(), f64::from(*p) * 100.0))
                .collect()
        })
        .unwrap_or_default();

    Ok(DiagnosisResult {
        name: raw.label.clone(),
        confidence: f64::from(raw.confidence) * 100.0,
        severity: record.map(|r| r.severity),
        description: record.map(|r| r.description.clone()),
        recommendations: record.map(|r| r.recommendations.clone()).unwrap_or_default(),
        all_probabilities,
    })
}

/// Absorbs normalization faults into the "Unknown" result so the caller
/// always gets a response.
pub fn normalize_or_unknown(
    raw: &RawPrediction,
    kb: &HashMap<String, DiseaseRecord>,
) -> DiagnosisResult {
    match normalize(raw, kb) {
        Ok(result) => result,
        Err(e) => {
            warn!(
                error = %e,
                label = %raw.label,
                "normalization degraded, substituting the unknown result"
            );
            DiagnosisResult::unknown()
        }
    }
}
