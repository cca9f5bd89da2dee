use ndarray::prelude::*;

use crate::errors::{LeafError, Result};
use crate::traits::ClassifierModel;

/// Scripted classifier returning a fixed probability vector.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub probabilities: Vec<f32>,
    pub input_hw: Option<(u32, u32)>,
}

impl MockClassifier {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self {
            probabilities,
            input_hw: Some((224, 224)),
        }
    }

    pub fn with_input_hw(mut self, input_hw: Option<(u32, u32)>) -> Self {
        self.input_hw = input_hw;
        self
    }
}

impl ClassifierModel for MockClassifier {
    fn predict(&self, _tensor: ArrayView4<'_, f32>) -> Result<Array1<f32>> {
        Ok(Array1::from(self.probabilities.clone()))
    }

    fn declared_input_hw(&self) -> Option<(u32, u32)> {
        self.input_hw
    }

    fn output_width(&self) -> Option<usize> {
        Some(self.probabilities.len())
    }
}

/// Classifier whose forward pass always faults.
#[derive(Debug, Clone, Default)]
pub struct FailingClassifier;

impl ClassifierModel for FailingClassifier {
    fn predict(&self, _tensor: ArrayView4<'_, f32>) -> Result<Array1<f32>> {
        Err(LeafError::Model {
            operation: "forward pass".to_string(),
            source: Box::new(std::io::Error::other("scripted model fault")),
        })
    }

    fn declared_input_hw(&self) -> Option<(u32, u32)> {
        Some((224, 224))
    }

    fn output_width(&self) -> Option<usize> {
        None
    }
}
