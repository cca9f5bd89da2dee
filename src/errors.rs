use std::path::PathBuf;

use thiserror::Error;

use crate::crop::Crop;

/// Structured error types for the diagnosis service.
///
/// Each variant captures context specific to its error domain (artifact
/// loading, image decoding, model execution), so the HTTP layer can map
/// errors to status codes without parsing error strings.
#[derive(Error, Debug)]
pub enum LeafError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{crop} classifier is unavailable: {cause}")]
    ModelUnavailable { crop: Crop, cause: String },

    #[error("Inference failed for {crop}: {operation}")]
    InferenceFailed {
        crop: Crop,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not normalize prediction: {reason}")]
    Normalization { reason: String },

    #[error("Inference capacity exhausted")]
    ServiceBusy,
}

pub type Result<T> = std::result::Result<T, LeafError>;

/// Decode failures from the image crate are client-input errors.
impl From<image::ImageError> for LeafError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidImage {
            reason: err.to_string(),
        }
    }
}

impl From<ort::Error> for LeafError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Shape errors occur during tensor operations which are part of model
/// inference, so they are categorized as model errors.
impl From<ndarray::ShapeError> for LeafError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}

/// Fallback for I/O errors without path/operation context. Code that has
/// context constructs `LeafError::FileSystem` directly.
impl From<std::io::Error> for LeafError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}
