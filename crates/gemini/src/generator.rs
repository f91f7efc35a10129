//! [`PageGenerator`] implementation backed by [`GeminiApi`].

use async_trait::async_trait;

use deckgen_core::image::ImageData;
use deckgen_pipeline::{GenerateError, PageGenerator, PageRequest};

use crate::api::{GeminiApi, ImageOptions};

#[async_trait]
impl PageGenerator for GeminiApi {
    async fn generate(&self, request: PageRequest) -> Result<ImageData, GenerateError> {
        let options = ImageOptions {
            aspect_ratio: request.aspect_ratio.clone(),
            image_size: request.image_size.clone(),
        };
        self.generate_image(&request.instruction, &request.references, &options)
            .await
            .map_err(|e| GenerateError::Service(e.to_string()))
    }
}
