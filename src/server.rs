use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::crop::Crop;
use crate::errors::{LeafError, Result};
use crate::normalize::DiagnosisResult;
use crate::registry::HealthReport;
use crate::DiagnosisService;

/// Builds the application router around a shared diagnosis service.
pub fn router(service: Arc<DiagnosisService>, config: &Config) -> Router {
    Router::new()
        .route("/api/analyze/mango", post(analyze_mango))
        .route("/api/analyze/cashew", post(analyze_cashew))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.allow_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn analyze_mango(
    State(service): State<Arc<DiagnosisService>>,
    multipart: Multipart,
) -> Result<Json<DiagnosisResult>> {
    analyze(service, Crop::Mango, multipart).await
}

async fn analyze_cashew(
    State(service): State<Arc<DiagnosisService>>,
    multipart: Multipart,
) -> Result<Json<DiagnosisResult>> {
    analyze(service, Crop::Cashew, multipart).await
}

async fn analyze(
    service: Arc<DiagnosisService>,
    crop: Crop,
    multipart: Multipart,
) -> Result<Json<DiagnosisResult>> {
    let request_id = Uuid::new_v4();
    let bytes = read_image_field(multipart).await?;
    info!(%request_id, %crop, bytes = bytes.len(), "analyzing upload");

    let result = service.diagnose(crop, &bytes).await?;
    info!(%request_id, %crop, label = %result.name, "diagnosis complete");
    Ok(Json(result))
}

/// Pulls the uploaded bytes out of the multipart body. The front end sends
/// a single file field named `image`.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LeafError::InvalidImage {
            reason: format!("malformed multipart body: {e}"),
        })?
    {
        if field.name() != Some("image") {
            continue;
        }
        if let Some(content_type) = field.content_type() {
            if !content_type.starts_with("image/") {
                return Err(LeafError::InvalidImage {
                    reason: format!("uploaded file is not an image: {content_type}"),
                });
            }
        }
        let bytes = field.bytes().await.map_err(|e| LeafError::InvalidImage {
            reason: format!("could not read upload: {e}"),
        })?;
        if bytes.is_empty() {
            return Err(LeafError::InvalidImage {
                reason: "uploaded image is empty".to_string(),
            });
        }
        return Ok(bytes.to_vec());
    }

    Err(LeafError::InvalidImage {
        reason: "missing multipart field 'image'".to_string(),
    })
}

async fn health(State(service): State<Arc<DiagnosisService>>) -> Json<HealthReport> {
    Json(service.health())
}

/// Client-input errors carry their reason to the caller; server-side
/// failures answer opaquely and log the full cause for operators.
impl IntoResponse for LeafError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::InvalidImage { reason } => (StatusCode::BAD_REQUEST, reason.clone()),
            Self::ServiceBusy => (
                StatusCode::SERVICE_UNAVAILABLE,
                "inference capacity exhausted, try again shortly".to_string(),
            ),
            Self::ModelUnavailable { crop, .. } => {
                error!(error = %self, "request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("{crop} classifier is unavailable"),
                )
            }
            _ => {
                error!(error = ?self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "inference error".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
