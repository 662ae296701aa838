use utoipa::OpenApi;

use crate::apis::health;
use crate::apis::models_api;
use crate::apis::models_api::schemas::{
    EditRequest, GenerationRequest, HttpUrl, ImageQuality, ImageResult, ImageSize, OperationResult,
    RemoveBackgroundParams,
};
use crate::apis::schemas::{ErrorResponse, HealthResponse};
use crate::configs::settings::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        models_api::image::generate,
        models_api::image::edit,
        models_api::image::remove_background,
    ),
    components(
        schemas(GenerationRequest,EditRequest,RemoveBackgroundParams,ImageSize,ImageQuality,HttpUrl,ImageResult,OperationResult,ErrorResponse,HealthResponse)
    ),
    tags(
        (name = "images", description = "AI image generation and editing"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

// Title, description and version come from configuration.
pub fn openapi(config: &Config) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = config.title.clone();
    doc.info.description = Some(config.description.clone());
    doc.info.version = config.version.clone();
    doc
}
