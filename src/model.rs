use std::path::Path;

use ndarray::prelude::*;
use ort::execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider};
use ort::session::{builder::SessionBuilder, Session};
use ort::value::TensorRef;
use parking_lot::Mutex;

use crate::errors::{LeafError, Result};
use crate::traits::ClassifierModel;

/// ONNX-backed classifier. `Session::run` needs exclusive access, so the
/// session sits behind a mutex and forward passes for one crop serialize.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_hw: Option<(u32, u32)>,
    output_width: Option<usize>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, device_id: i32) -> Result<Self> {
        let session = SessionBuilder::new()
            .map_err(|e| LeafError::Model {
                operation: "session builder init".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| LeafError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| LeafError::Model {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| LeafError::Model {
                operation: format!("model file load: {}", model_path.display()),
                source: Box::new(e),
            })?;

        let input = session.inputs.first().ok_or_else(|| LeafError::Model {
            operation: "model input introspection".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "model declares no inputs",
            )),
        })?;
        let input_name = input.name.clone();
        // NHWC classifiers declare (batch, height, width, channels); a
        // dynamic axis shows up as a non-positive dim and disqualifies the
        // declared shape.
        let input_hw = input.input_type.tensor_shape().and_then(|dims| {
            if dims.len() == 4 && dims[1] > 0 && dims[2] > 0 {
                Some((dims[1] as u32, dims[2] as u32))
            } else {
                None
            }
        });

        let output = session.outputs.first().ok_or_else(|| LeafError::Model {
            operation: "model output introspection".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "model declares no outputs",
            )),
        })?;
        let output_name = output.name.clone();
        let output_width = output.output_type.tensor_shape().and_then(|dims| {
            let rank = dims.len();
            if rank > 0 && dims[rank - 1] > 0 {
                Some(dims[rank - 1] as usize)
            } else {
                None
            }
        });

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_hw,
            output_width,
        })
    }

    /// Pushes one zero tensor through the graph so shape mismatches surface
    /// at load time instead of on the first request.
    pub fn warm_up(&self, height: u32, width: u32) -> Result<()> {
        let zeros = Array4::<f32>::zeros((1, height as usize, width as usize, 3));
        self.predict(zeros.view()).map(|_| ())
    }
}

impl ClassifierModel for OnnxClassifier {
    fn predict(&self, tensor: ArrayView4<'_, f32>) -> Result<Array1<f32>> {
        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![
            self.input_name.clone() => TensorRef::from_array_view(&tensor.as_standard_layout())?
        ])?;
        let probs = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix2>()?;
        Ok(probs.row(0).to_owned())
    }

    fn declared_input_hw(&self) -> Option<(u32, u32)> {
        self.input_hw
    }

    fn output_width(&self) -> Option<usize> {
        self.output_width
    }
}
