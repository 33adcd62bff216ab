//! Object and material detection handlers.
//!
//! Two-step flow: `detect-objects` suggests object names for a photo, the
//! caller edits them, and `detect-materials` classifies the confirmed names.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use url::Url;

use crate::extract::{Json, Path, ValidateJson};
use crate::handler::request::{AnalysisPathParams, DetectMaterials, DetectObjects};
use crate::handler::response::{AnalysisRecord, DetectedObjects, ErrorResponse, MaterialResults};
use crate::handler::{ErrorKind, Result};
use crate::service::{AnalysisService, ServiceState};

/// Tracing target for analysis handlers.
const TRACING_TARGET: &str = "vizor_server::handler::analysis";

/// Detects the objects on a photo and records the request.
#[tracing::instrument(skip_all, fields(image_url = %request.image_url))]
async fn detect_objects(
    State(analysis): State<AnalysisService>,
    ValidateJson(request): ValidateJson<DetectObjects>,
) -> Result<(StatusCode, Json<DetectedObjects>)> {
    tracing::debug!(target: TRACING_TARGET, "Detecting objects");

    let image_url = Url::parse(&request.image_url).map_err(|err| {
        ErrorKind::BadRequest
            .with_message("Image URL is not a valid absolute URL")
            .with_resource("image")
            .with_context(err.to_string())
    })?;

    let detection = analysis.detect_objects(&image_url).await?;

    tracing::info!(
        target: TRACING_TARGET,
        request_id = %detection.request_id,
        object_count = detection.objects.len(),
        "Objects detected"
    );

    Ok((StatusCode::CREATED, Json(detection.into())))
}

fn detect_objects_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Detect objects")
        .description(
            "Downloads the image, asks the vision model to list the physical objects on it \
            and records the request. If the model answer cannot be decoded, \
            `probableObjects` holds that answer as its only entry.",
        )
        .response::<201, Json<DetectedObjects>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
        .response::<504, Json<ErrorResponse>>()
}

/// Classifies the materials of the confirmed objects.
#[tracing::instrument(skip_all, fields(request_id = %request.request_id))]
async fn detect_materials(
    State(analysis): State<AnalysisService>,
    ValidateJson(request): ValidateJson<DetectMaterials>,
) -> Result<(StatusCode, Json<MaterialResults>)> {
    let confirmed_objects = request.object_names();

    tracing::debug!(
        target: TRACING_TARGET,
        confirmed_count = confirmed_objects.len(),
        "Detecting materials"
    );

    let results = analysis
        .detect_materials(request.request_id, &confirmed_objects)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        result_count = results.len(),
        "Materials detected"
    );

    Ok((StatusCode::OK, Json(results)))
}

fn detect_materials_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Detect materials")
        .description(
            "Downloads the image of a recorded request again and asks the vision model \
            which materials the confirmed objects are made of. Replaces any result \
            stored for the request. An undecodable model answer yields an empty list.",
        )
        .response::<200, Json<MaterialResults>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
        .response::<504, Json<ErrorResponse>>()
}

/// Returns a recorded request with its latest material results.
#[tracing::instrument(skip_all, fields(request_id = %path_params.request_id))]
async fn get_analysis(
    State(analysis): State<AnalysisService>,
    Path(path_params): Path<AnalysisPathParams>,
) -> Result<(StatusCode, Json<AnalysisRecord>)> {
    let details = analysis.get_analysis(path_params.request_id).await?;
    Ok((StatusCode::OK, Json(details.into())))
}

fn get_analysis_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get analysis")
        .description("Returns a recorded request and the objects of its last material detection.")
        .response::<200, Json<AnalysisRecord>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for the analysis flow.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/analysis/detect-objects",
            post_with(detect_objects, detect_objects_docs),
        )
        .api_route(
            "/analysis/detect-materials",
            post_with(detect_materials, detect_materials_docs),
        )
        .api_route(
            "/analysis/{requestId}",
            get_with(get_analysis, get_analysis_docs),
        )
        .with_path_items(|item| item.tag("Analysis"))
}
