pub mod config;
pub mod crop;
pub mod dispatch;
pub mod errors;
pub mod infer;
pub mod knowledge;
pub mod model;
pub mod normalize;
pub mod preprocess;
pub mod registry;
pub mod server;
pub mod traits;

pub mod mocks;

use tracing::info;

pub use config::Config;
pub use crop::Crop;
pub use dispatch::InferencePool;
pub use errors::{LeafError, Result};
pub use infer::RawPrediction;
pub use knowledge::{DiseaseRecord, KnowledgeBase, Severity};
pub use normalize::DiagnosisResult;
pub use registry::{ClassifierSpec, HealthReport, ModelRegistry};
pub use traits::ClassifierModel;

/// Ties the request pipeline together: decode the upload, look up the
/// crop's classifier, run the blocking work on the pool, normalize the
/// outcome against the knowledge base.
pub struct DiagnosisService {
    registry: ModelRegistry,
    pool: InferencePool,
    knowledge: KnowledgeBase,
}

impl DiagnosisService {
    pub fn new(registry: ModelRegistry, pool: InferencePool, knowledge: KnowledgeBase) -> Self {
        Self {
            registry,
            pool,
            knowledge,
        }
    }

    pub async fn diagnose(&self, crop: Crop, bytes: &[u8]) -> Result<DiagnosisResult> {
        let image = preprocess::decode_image(bytes)?;
        let spec = self.registry.get_spec(crop)?.clone();

        let raw = self
            .pool
            .dispatch(move || {
                let tensor = preprocess::prepare(&image, spec.input_height, spec.input_width)?;
                infer::infer(&spec, tensor)
            })
            .await?;

        info!(%crop, label = %raw.label, confidence = raw.confidence, "prediction complete");
        Ok(normalize::normalize_or_unknown(
            &raw,
            self.knowledge.for_crop(crop),
        ))
    }

    pub fn health(&self) -> HealthReport {
        self.registry.health()
    }
}
