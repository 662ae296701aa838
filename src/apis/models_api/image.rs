use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{post, web, Error, HttpRequest, HttpResponse};

use crate::apis::models_api::schemas::{EditRequest, GenerationRequest, OperationResult, RemoveBackgroundParams};
use crate::apis::schemas::ErrorResponse;
use crate::cores::image_models::image_controller::ImageService;

// Configure the actix_web service routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/images")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(generate)
            .service(edit)
            .service(remove_background),
    );
}

// Body that cannot be decoded into the request type is an input error, not a server error.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = unprocessable(err.to_string());
    InternalError::from_response(err, response).into()
}

fn unprocessable(detail: impl Into<String>) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse::new(detail))
}

// Map the envelope onto the wire: failures become 500 with the provider's error text.
// The detail travels as the response error so the access log can record it.
fn into_response(result: OperationResult, fallback: &str) -> Result<HttpResponse, Error> {
    if result.success() {
        log::debug!("Returning {} image(s)", result.images().len());
        return Ok(HttpResponse::Ok().json(result));
    }
    let detail = result
        .error_message()
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string();
    let response = HttpResponse::InternalServerError().json(ErrorResponse::new(detail.clone()));
    Err(InternalError::from_response(detail, response).into())
}

#[utoipa::path(
    post,
    path = "/api/v1/images/generate",
    tag = "images",
    request_body = GenerationRequest,
    responses(
        (status = 200, body = OperationResult),
        (status = 422, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
// Handle the POST request for /api/v1/images/generate.
#[post("/generate")]
pub async fn generate(
    req_body: web::Json<GenerationRequest>,
    service: web::Data<dyn ImageService>,
) -> Result<HttpResponse, Error> {
    // 1. Validate the fields serde cannot check on its own.
    if let Err(err) = req_body.validate() {
        return Ok(unprocessable(err));
    }

    // 2. Call the provider and map the envelope
    let result = service.generate(&req_body).await;
    into_response(result, "Image generation failed")
}

#[utoipa::path(
    post,
    path = "/api/v1/images/edit",
    tag = "images",
    request_body = EditRequest,
    responses(
        (status = 200, body = OperationResult),
        (status = 422, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
// Handle the POST request for /api/v1/images/edit.
#[post("/edit")]
pub async fn edit(req_body: web::Json<EditRequest>, service: web::Data<dyn ImageService>) -> Result<HttpResponse, Error> {
    if let Err(err) = req_body.validate() {
        return Ok(unprocessable(err));
    }

    let result = service.edit(&req_body).await;
    into_response(result, "Image editing failed")
}

// `image_url` comes from the query string; a JSON body is accepted when there is no query.
fn remove_background_params(req: &HttpRequest, body: &web::Bytes) -> Result<RemoveBackgroundParams, String> {
    if !req.query_string().is_empty() || body.is_empty() {
        return web::Query::<RemoveBackgroundParams>::from_query(req.query_string())
            .map(|query| query.into_inner())
            .map_err(|err| err.to_string());
    }
    serde_json::from_slice(body).map_err(|err| format!("Json deserialize error: {}", err))
}

#[utoipa::path(
    post,
    path = "/api/v1/images/remove-background",
    tag = "images",
    params(
        ("image_url" = String, Query, description = "URL of the image to process"),
    ),
    responses(
        (status = 200, body = OperationResult),
        (status = 422, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
// Handle the POST request for /api/v1/images/remove-background.
#[post("/remove-background")]
pub async fn remove_background(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<dyn ImageService>,
) -> Result<HttpResponse, Error> {
    let params = match remove_background_params(&req, &body) {
        Ok(params) => params,
        Err(err) => return Ok(unprocessable(err)),
    };

    let result = service.remove_background(&params.image_url).await;
    into_response(result, "Background removal failed")
}
