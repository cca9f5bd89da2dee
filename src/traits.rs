use ndarray::prelude::*;

use crate::errors::Result;

/// Abstraction over a loaded classifier so the registry can be backed by a
/// real ONNX session in production and a scripted fake in tests.
pub trait ClassifierModel: Send + Sync {
    /// Run the forward pass on a single-item batch and return the raw
    /// class-probability vector.
    fn predict(&self, tensor: ArrayView4<'_, f32>) -> Result<Array1<f32>>;

    /// Input (height, width) declared by the model, when it declares one.
    fn declared_input_hw(&self) -> Option<(u32, u32)>;

    /// Width of the output probability vector, when the model declares it.
    fn output_width(&self) -> Option<usize>;
}
