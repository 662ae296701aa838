use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::apis::models_api::schemas::{EditRequest, GenerationRequest, HttpUrl, ImageResult, OperationResult};
use crate::configs::settings::Config;
use crate::cores::errors::ProviderError;
use crate::cores::image_models::image_controller::ImageService;

const RESPONSE_FORMAT: &str = "url";
const DEFAULT_IMAGE_MIME: &str = "image/png";
// The edits endpoint rejects images larger than 4 MB.
const MAX_SOURCE_IMAGE_BYTES: usize = 4 * 1024 * 1024;

// ------------------------------------------ Wire format ------------------------------------------
#[derive(Serialize)]
struct GenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    n: u32,
    response_format: &'static str,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ImageData {
    fn into_result(self, keep_revised_prompt: bool) -> Result<ImageResult, ProviderError> {
        let url = self
            .url
            .ok_or_else(|| ProviderError::MalformedResponse("image item has no url".into()))?;
        let url = HttpUrl::parse(&url).map_err(ProviderError::MalformedResponse)?;
        Ok(ImageResult {
            url,
            revised_prompt: if keep_revised_prompt { self.revised_prompt } else { None },
        })
    }
}

// ------------------------------------------ Service ------------------------------------------
/// `ImageService` backed by the OpenAI Images API.
///
/// One instance is built at startup and shared by every request; it holds no
/// mutable state.
pub struct OpenAIImageService {
    client: Client,
    api_key: String,
    base_url: String,
    generation_model: String,
    edit_model: String,
}

impl OpenAIImageService {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ProviderError::ClientBuild)?;

        Ok(OpenAIImageService {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            generation_model: config.generation_model.clone(),
            edit_model: config.edit_model.clone(),
        })
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<Vec<ImageResult>, ProviderError> {
        let body = GenerationBody {
            model: &self.generation_model,
            prompt: &request.prompt,
            size: request.size.as_str(),
            quality: request.quality.as_str(),
            n: request.n,
            response_format: RESPONSE_FORMAT,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let data = read_images(response).await?;
        data.into_iter().map(|item| item.into_result(true)).collect()
    }

    async fn try_edit(&self, request: &EditRequest) -> Result<Vec<ImageResult>, ProviderError> {
        let image = self.fetch_image(&request.image_url).await?;
        let mut form = Form::new()
            .part("image", image)
            .text("prompt", request.prompt.clone())
            .text("n", request.n.to_string())
            .text("size", request.size.as_str())
            .text("model", self.edit_model.clone())
            .text("response_format", RESPONSE_FORMAT);

        if let Some(mask_url) = &request.mask_url {
            form = form.part("mask", self.fetch_image(mask_url).await?);
        }

        let response = self
            .client
            .post(format!("{}/images/edits", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        // Edit responses carry no revised prompt worth keeping.
        let data = read_images(response).await?;
        data.into_iter().map(|item| item.into_result(false)).collect()
    }

    // The edit endpoint wants the image bytes, not a URL.
    async fn fetch_image(&self, url: &HttpUrl) -> Result<Part, ProviderError> {
        let source_error = |reason: String| ProviderError::SourceImage {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(|err| source_error(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(source_error(format!("HTTP {}", status)));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

        let too_large = || source_error(format!("image exceeds {} bytes", MAX_SOURCE_IMAGE_BYTES));
        if response
            .content_length()
            .map_or(false, |len| len > MAX_SOURCE_IMAGE_BYTES as u64)
        {
            return Err(too_large());
        }

        // Content-Length is optional; the cap also holds while streaming.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| source_error(err.to_string()))?
        {
            if bytes.len() + chunk.len() > MAX_SOURCE_IMAGE_BYTES {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(source_error("empty body".into()));
        }

        Part::bytes(bytes)
            .file_name(file_name_of(url))
            .mime_str(&mime)
            .map_err(|err| source_error(err.to_string()))
    }
}

fn file_name_of(url: &HttpUrl) -> String {
    url.as_url()
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("image.png")
        .to_string()
}

async fn read_images(response: Response) -> Result<Vec<ImageData>, ProviderError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error.message,
            Err(_) if text.trim().is_empty() => status.canonical_reason().unwrap_or("unknown error").to_string(),
            Err(_) => text,
        };
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: ImagesResponse =
        serde_json::from_str(&text).map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;
    if parsed.data.is_empty() {
        return Err(ProviderError::MalformedResponse("provider returned no images".into()));
    }
    Ok(parsed.data)
}

#[async_trait]
impl ImageService for OpenAIImageService {
    async fn generate(&self, request: &GenerationRequest) -> OperationResult {
        info!(
            "Generating {} image(s) with {} ({}, {})",
            request.n,
            self.generation_model,
            request.size.as_str(),
            request.quality.as_str()
        );
        match self.try_generate(request).await {
            Ok(images) => OperationResult::ok(images),
            Err(err) => {
                error!(target: "error_log", "Error generating image: {}", err);
                OperationResult::failed(err.to_string())
            }
        }
    }

    async fn edit(&self, request: &EditRequest) -> OperationResult {
        info!("Editing {} with {}", request.image_url, self.edit_model);
        match self.try_edit(request).await {
            Ok(images) => OperationResult::ok(images),
            Err(err) => {
                error!(target: "error_log", "Error editing image: {}", err);
                OperationResult::failed(err.to_string())
            }
        }
    }
}
