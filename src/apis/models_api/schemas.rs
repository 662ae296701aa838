use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use url::Url;
use utoipa::ToSchema;

pub const REMOVE_BACKGROUND_PROMPT: &str = "remove background, transparent background";
// The provider accepts at most 10 images per call.
pub const MAX_IMAGES_PER_REQUEST: u32 = 10;

// ------------------------------------------ Url ------------------------------------------
/// An absolute `http`/`https` URL with a host. Anything else is rejected while
/// the request body is being deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "https://example.com/image.png")]
pub struct HttpUrl(Url);

impl HttpUrl {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw.trim()).map_err(|err| format!("invalid URL '{}': {}", raw, err))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(format!("invalid URL '{}': scheme '{}' is not http or https", raw, scheme)),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(format!("invalid URL '{}': missing host", raw));
        }
        Ok(HttpUrl(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        HttpUrl::parse(&raw).map_err(de::Error::custom)
    }
}

// ------------------------------------------ Enums ------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square256 => "256x256",
            ImageSize::Square512 => "512x512",
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Landscape => "1792x1024",
            ImageSize::Portrait => "1024x1792",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

fn default_count() -> u32 {
    1
}

fn validate_prompt_and_count(prompt: &str, n: u32) -> Result<(), String> {
    if prompt.trim().is_empty() {
        return Err("prompt cannot be empty".into());
    }
    if n == 0 || n > MAX_IMAGES_PER_REQUEST {
        return Err(format!("n must be between 1 and {}, got {}", MAX_IMAGES_PER_REQUEST, n));
    }
    Ok(())
}

// ------------------------------------------ Requests ------------------------------------------
// Request body of POST /api/v1/images/generate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct GenerationRequest {
    #[schema(example = "a red fox in the snow")]
    pub prompt: String,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub quality: ImageQuality,
    #[serde(default = "default_count")]
    #[schema(default = 1, minimum = 1, maximum = 10)]
    pub n: u32,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_prompt_and_count(&self.prompt, self.n)
    }
}

// Request body of POST /api/v1/images/edit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct EditRequest {
    pub image_url: HttpUrl,
    #[schema(example = "add a hat")]
    pub prompt: String,
    #[serde(default)]
    pub mask_url: Option<HttpUrl>,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default = "default_count")]
    #[schema(default = 1, minimum = 1, maximum = 10)]
    pub n: u32,
}

impl EditRequest {
    pub fn new(image_url: HttpUrl, prompt: impl Into<String>) -> Self {
        EditRequest {
            image_url,
            prompt: prompt.into(),
            mask_url: None,
            size: ImageSize::default(),
            n: default_count(),
        }
    }

    /// The edit that stands in for background removal, which the provider has
    /// no dedicated endpoint for.
    pub fn remove_background(image_url: HttpUrl) -> Self {
        EditRequest::new(image_url, REMOVE_BACKGROUND_PROMPT)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_prompt_and_count(&self.prompt, self.n)
    }
}

// Query string (or JSON body) of POST /api/v1/images/remove-background.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RemoveBackgroundParams {
    pub image_url: HttpUrl,
}

// ------------------------------------------ Results ------------------------------------------
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ImageResult {
    pub url: HttpUrl,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// Uniform envelope returned by every image operation.
///
/// Only constructible through [`OperationResult::ok`] and
/// [`OperationResult::failed`]: a failed result never carries images, and a
/// successful one never carries an error message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct OperationResult {
    success: bool,
    images: Vec<ImageResult>,
    error_message: Option<String>,
}

impl OperationResult {
    pub fn ok(images: Vec<ImageResult>) -> Self {
        OperationResult {
            success: true,
            images,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        OperationResult {
            success: false,
            images: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn images(&self) -> &[ImageResult] {
        &self.images
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
