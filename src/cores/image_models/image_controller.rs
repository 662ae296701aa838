use async_trait::async_trait;

use crate::apis::models_api::schemas::{EditRequest, GenerationRequest, HttpUrl, OperationResult};

/// The image operations the HTTP surface depends on.
///
/// Implementations must never fail at the type level: any provider-side
/// problem comes back as `OperationResult::failed`.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> OperationResult;

    async fn edit(&self, request: &EditRequest) -> OperationResult;

    // No provider has a dedicated endpoint for this; it is an edit with a fixed prompt.
    async fn remove_background(&self, image_url: &HttpUrl) -> OperationResult {
        let request = EditRequest::remove_background(image_url.clone());
        self.edit(&request).await
    }
}
