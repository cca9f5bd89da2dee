use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::crop::Crop;
use crate::errors::{LeafError, Result};
use crate::model::OnnxClassifier;
use crate::traits::ClassifierModel;

/// Fallback when a model does not declare a usable input shape.
pub const DEFAULT_INPUT_HW: (u32, u32) = (224, 224);

/// Everything the pipeline needs to run one crop's classifier.
#[derive(Clone)]
pub struct ClassifierSpec {
    pub crop: Crop,
    pub model: Arc<dyn ClassifierModel>,
    /// Ordered class labels, index-aligned with the model output. `None`
    /// degrades label resolution to stringified indices.
    pub labels: Option<Vec<String>>,
    pub input_height: u32,
    pub input_width: u32,
}

impl ClassifierSpec {
    /// Derives the input resolution and validates label alignment for a
    /// loaded model. A declared output width that disagrees with the label
    /// list is a load failure: predictions would be silently mislabeled.
    pub fn resolve(
        crop: Crop,
        model: Arc<dyn ClassifierModel>,
        labels: Option<Vec<String>>,
    ) -> Result<Self> {
        let (input_height, input_width) = match model.declared_input_hw() {
            Some(hw) => hw,
            None => {
                warn!(
                    %crop,
                    height = DEFAULT_INPUT_HW.0,
                    width = DEFAULT_INPUT_HW.1,
                    "input shape introspection failed, using default resolution"
                );
                DEFAULT_INPUT_HW
            }
        };

        if let (Some(width), Some(labels)) = (model.output_width(), labels.as_ref()) {
            if width != labels.len() {
                return Err(LeafError::Configuration {
                    message: format!(
                        "{crop} class map has {} entries but the model outputs {width} classes",
                        labels.len()
                    ),
                });
            }
        }
        if labels.is_none() {
            warn!(%crop, "no class map loaded, labels degrade to output indices");
        }

        Ok(Self {
            crop,
            model,
            labels,
            input_height,
            input_width,
        })
    }
}

/// Per-crop load state for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CropHealth {
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub mango: CropHealth,
    pub cashew: CropHealth,
}

/// Holds each crop's classifier, constructed once at startup and passed by
/// reference into request handlers. A crop whose artifacts fail to load is
/// recorded with its cause and answered with `ModelUnavailable` on use; the
/// process keeps serving the other crop.
pub struct ModelRegistry {
    entries: HashMap<Crop, std::result::Result<ClassifierSpec, String>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Loads every crop's artifacts from the configured model directory.
    pub fn load(config: &Config) -> Self {
        let mut registry = Self::new();
        for crop in Crop::ALL {
            match Self::load_spec(crop, config) {
                Ok(spec) => {
                    info!(
                        %crop,
                        height = spec.input_height,
                        width = spec.input_width,
                        classes = spec.labels.as_ref().map(Vec::len),
                        "classifier loaded"
                    );
                    registry.insert_spec(spec);
                }
                Err(e) => {
                    error!(%crop, error = %e, "classifier failed to load");
                    registry.insert_failure(crop, e.to_string());
                }
            }
        }
        registry
    }

    fn load_spec(crop: Crop, config: &Config) -> Result<ClassifierSpec> {
        let model = Arc::new(OnnxClassifier::load(
            &config.model_path(crop),
            config.device_id,
        )?);
        let class_map_path = config.class_map_path(crop);
        let labels = match read_class_map(&class_map_path) {
            Ok(labels) => Some(labels),
            Err(e) => {
                warn!(%crop, error = %e, "class map unavailable");
                None
            }
        };
        let spec = ClassifierSpec::resolve(crop, model.clone(), labels)?;
        model.warm_up(spec.input_height, spec.input_width)?;
        Ok(spec)
    }

    pub fn insert_spec(&mut self, spec: ClassifierSpec) {
        self.entries.insert(spec.crop, Ok(spec));
    }

    pub fn insert_failure(&mut self, crop: Crop, cause: impl Into<String>) {
        self.entries.insert(crop, Err(cause.into()));
    }

    pub fn get_spec(&self, crop: Crop) -> Result<&ClassifierSpec> {
        match self.entries.get(&crop) {
            Some(Ok(spec)) => Ok(spec),
            Some(Err(cause)) => Err(LeafError::ModelUnavailable {
                crop,
                cause: cause.clone(),
            }),
            None => Err(LeafError::ModelUnavailable {
                crop,
                cause: "no classifier registered".to_string(),
            }),
        }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok",
            mango: self.crop_health(Crop::Mango),
            cashew: self.crop_health(Crop::Cashew),
        }
    }

    fn crop_health(&self, crop: Crop) -> CropHealth {
        match self.entries.get(&crop) {
            Some(Ok(_)) => CropHealth {
                model_loaded: true,
                error: None,
            },
            Some(Err(cause)) => CropHealth {
                model_loaded: false,
                error: Some(cause.clone()),
            },
            None => CropHealth {
                model_loaded: false,
                error: Some("no classifier registered".to_string()),
            },
        }
    }
}

/// Reads the class-map artifact: a JSON array of label strings whose index
/// matches the model output index.
fn read_class_map(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| LeafError::FileSystem {
        path: path.to_path_buf(),
        operation: "class map open".to_string(),
        source: e,
    })?;
    let labels: Vec<String> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| LeafError::Configuration {
            message: format!(
                "class map {} is not a JSON array of strings: {e}",
                path.display()
            ),
        })?;
    if labels.is_empty() {
        return Err(LeafError::Configuration {
            message: format!("class map {} is empty", path.display()),
        });
    }
    Ok(labels)
}
