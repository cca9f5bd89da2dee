use ndarray::prelude::*;
use tracing::warn;

use crate::errors::{LeafError, Result};
use crate::registry::ClassifierSpec;

/// Ordered probability vector plus the derived top-1 class.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub probabilities: Vec<f32>,
    pub index: usize,
    pub label: String,
    pub confidence: f32,
    /// Labels the vector positions resolve to, when a class map was loaded.
    pub labels: Option<Vec<String>>,
}

/// Runs the forward pass for one prepared tensor and derives the top-1
/// prediction. Any fault in the model call surfaces as `InferenceFailed`
/// with the crop attached; no partially populated prediction escapes.
pub fn infer(spec: &ClassifierSpec, tensor: Array4<f32>) -> Result<RawPrediction> {
    let probs = spec
        .model
        .predict(tensor.view())
        .map_err(|e| LeafError::InferenceFailed {
            crop: spec.crop,
            operation: "forward pass".to_string(),
            source: Box::new(e),
        })?;
    let probabilities = probs.to_vec();

    let (index, &confidence) = probabilities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .ok_or_else(|| LeafError::InferenceFailed {
            crop: spec.crop,
            operation: "probability extraction".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "model returned an empty output row",
            )),
        })?;

    let label = match spec.labels.as_ref().and_then(|labels| labels.get(index)) {
        Some(label) => label.clone(),
        None => {
            warn!(
                crop = %spec.crop,
                index,
                "no label for predicted index, falling back to the index itself"
            );
            index.to_string()
        }
    };

    Ok(RawPrediction {
        probabilities,
        index,
        label,
        confidence,
        labels: spec.labels.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::crop::Crop;
    use crate::mocks::{FailingClassifier, MockClassifier};

    fn spec_with(probabilities: Vec<f32>, labels: Option<Vec<String>>) -> ClassifierSpec {
        ClassifierSpec::resolve(
            Crop::Mango,
            Arc::new(MockClassifier::new(probabilities)),
            labels,
        )
        .unwrap()
    }

    fn input() -> Array4<f32> {
        Array4::zeros((1, 224, 224, 3))
    }

    #[test]
    fn test_argmax_and_confidence() -> Result<()> {
        let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let spec = spec_with(vec![0.1, 0.7, 0.2], Some(labels));

        let raw = infer(&spec, input())?;
        assert_eq!(raw.index, 1);
        assert_eq!(raw.label, "B");
        assert!((raw.confidence - 0.7).abs() < f32::EPSILON);
        assert_eq!(raw.probabilities.len(), 3);
        Ok(())
    }

    #[test]
    fn test_confidence_equals_vector_maximum() -> Result<()> {
        let probabilities = vec![0.05, 0.3, 0.25, 0.4];
        let spec = spec_with(
            probabilities.clone(),
            Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        );

        let raw = infer(&spec, input())?;
        assert!(raw.index < probabilities.len());
        let max = probabilities.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(raw.confidence, max);
        Ok(())
    }

    #[test]
    fn test_missing_class_map_degrades_to_index_label() -> Result<()> {
        let spec = spec_with(vec![0.2, 0.8], None);
        let raw = infer(&spec, input())?;
        assert_eq!(raw.label, "1");
        assert!(raw.labels.is_none());
        Ok(())
    }

    #[test]
    fn test_empty_output_row_is_an_inference_failure() {
        let spec = spec_with(vec![], None);
        let result = infer(&spec, input());
        assert!(matches!(
            result,
            Err(LeafError::InferenceFailed { crop: Crop::Mango, .. })
        ));
    }

    #[test]
    fn test_model_fault_maps_to_inference_failed() {
        let spec = ClassifierSpec::resolve(Crop::Cashew, Arc::new(FailingClassifier), None).unwrap();
        let result = infer(&spec, input());
        assert!(matches!(
            result,
            Err(LeafError::InferenceFailed { crop: Crop::Cashew, .. })
        ));
    }
}
