#[cfg(test)]
pub mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::apis::models_api::schemas::{EditRequest, GenerationRequest, HttpUrl};
    use crate::configs::settings::Config;
    use crate::cores::image_models::image_controller::ImageService;
    use crate::cores::image_models::openai::OpenAIImageService;

    fn service_for(base_url: &str) -> OpenAIImageService {
        let config = Config {
            openai_api_key: "test-key".to_string(),
            openai_base_url: format!("{}/v1", base_url),
            request_timeout_secs: 5,
            ..Config::default()
        };
        OpenAIImageService::new(&config).unwrap()
    }

    fn generation(prompt: &str, n: u32) -> GenerationRequest {
        serde_json::from_value(json!({"prompt": prompt, "n": n})).unwrap()
    }

    async fn mount_source_image(server: &MockServer, image_path: &str) {
        Mock::given(method("GET"))
            .and(path(image_path))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"fake image bytes".to_vec(), "image/png"),
            )
            .mount(server)
            .await;
    }

    #[actix_rt::test]
    async fn generate_wraps_each_item_and_keeps_revised_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "prompt": "a red fox",
                "size": "1024x1024",
                "quality": "standard",
                "n": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [
                    {"url": "https://cdn.test/1.png", "revised_prompt": "a red fox in snow"},
                    {"url": "https://cdn.test/2.png"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = service_for(&server.uri()).generate(&generation("a red fox", 2)).await;

        assert!(result.success());
        assert!(result.error_message().is_none());
        assert_eq!(result.images().len(), 2);
        assert_eq!(result.images()[0].url.to_string(), "https://cdn.test/1.png");
        assert_eq!(result.images()[0].revised_prompt.as_deref(), Some("a red fox in snow"));
        assert!(result.images()[1].revised_prompt.is_none());
    }

    #[actix_rt::test]
    async fn generate_provider_error_becomes_failed_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
            })))
            .mount(&server)
            .await;

        let result = service_for(&server.uri()).generate(&generation("a red fox", 1)).await;

        assert!(!result.success());
        assert!(result.images().is_empty());
        assert_eq!(result.error_message(), Some("Error code: 401 - Incorrect API key provided"));
    }

    #[actix_rt::test]
    async fn generate_non_json_error_keeps_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let result = service_for(&server.uri()).generate(&generation("a red fox", 1)).await;

        assert_eq!(result.error_message(), Some("Error code: 502 - upstream down"));
    }

    #[actix_rt::test]
    async fn generate_item_without_url_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{"b64_json": "aGVsbG8="}]
            })))
            .mount(&server)
            .await;

        let result = service_for(&server.uri()).generate(&generation("a red fox", 1)).await;

        assert!(!result.success());
        assert!(result.error_message().unwrap().contains("no url"));
    }

    #[actix_rt::test]
    async fn generate_empty_data_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": []
            })))
            .mount(&server)
            .await;

        let result = service_for(&server.uri()).generate(&generation("a red fox", 1)).await;

        assert!(!result.success());
        assert!(result.images().is_empty());
        assert!(result.error_message().unwrap().contains("no images"));
    }

    #[actix_rt::test]
    async fn generate_unreachable_provider_fails_without_panicking() {
        let result = service_for("http://127.0.0.1:1").generate(&generation("a red fox", 1)).await;

        assert!(!result.success());
        assert!(result.images().is_empty());
        assert!(!result.error_message().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn edit_uploads_source_image_and_drops_revised_prompt() {
        let server = MockServer::start().await;
        mount_source_image(&server, "/source.png").await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_string_contains("add a hat"))
            .and(body_string_contains("dall-e-2"))
            .and(body_string_contains("filename=\"source.png\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{"url": "https://cdn.test/edited.png", "revised_prompt": "ignored"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image_url = HttpUrl::parse(&format!("{}/source.png", server.uri())).unwrap();
        let result = service_for(&server.uri()).edit(&EditRequest::new(image_url, "add a hat")).await;

        assert!(result.success());
        assert_eq!(result.images().len(), 1);
        assert!(result.images()[0].revised_prompt.is_none());
    }

    #[actix_rt::test]
    async fn edit_fails_when_source_image_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let image_url = HttpUrl::parse(&format!("{}/missing.png", server.uri())).unwrap();
        let result = service_for(&server.uri()).edit(&EditRequest::new(image_url, "add a hat")).await;

        assert!(!result.success());
        assert!(result.error_message().unwrap().starts_with("Failed to fetch source image"));
    }

    #[actix_rt::test]
    async fn edit_forwards_mask_part() {
        let server = MockServer::start().await;
        mount_source_image(&server, "/source.png").await;
        Mock::given(method("GET"))
            .and(path("/mask.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"fake mask bytes".to_vec(), "image/png"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .and(body_string_contains("name=\"mask\""))
            .and(body_string_contains("filename=\"mask.png\""))
            .and(body_string_contains("fake mask bytes"))
            .and(body_string_contains("fake image bytes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{"url": "https://cdn.test/masked.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image_url = HttpUrl::parse(&format!("{}/source.png", server.uri())).unwrap();
        let mut request = EditRequest::new(image_url, "fill the sky");
        request.mask_url = Some(HttpUrl::parse(&format!("{}/mask.png", server.uri())).unwrap());
        let result = service_for(&server.uri()).edit(&request).await;

        assert!(result.success());
        assert_eq!(result.images()[0].url.to_string(), "https://cdn.test/masked.png");
    }

    #[actix_rt::test]
    async fn edit_fails_when_mask_is_missing() {
        let server = MockServer::start().await;
        mount_source_image(&server, "/source.png").await;
        Mock::given(method("GET"))
            .and(path("/mask.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let image_url = HttpUrl::parse(&format!("{}/source.png", server.uri())).unwrap();
        let mask_url = HttpUrl::parse(&format!("{}/mask.png", server.uri())).unwrap();
        let mut request = EditRequest::new(image_url, "fill the sky");
        request.mask_url = Some(mask_url.clone());
        let result = service_for(&server.uri()).edit(&request).await;

        assert!(!result.success());
        let message = result.error_message().unwrap();
        assert!(message.starts_with("Failed to fetch source image"));
        assert!(message.contains(&mask_url.to_string()));
    }

    #[actix_rt::test]
    async fn edit_rejects_oversized_source_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'a'; 4 * 1024 * 1024 + 1], "image/png"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let image_url = HttpUrl::parse(&format!("{}/huge.png", server.uri())).unwrap();
        let result = service_for(&server.uri()).edit(&EditRequest::new(image_url, "add a hat")).await;

        assert!(!result.success());
        let message = result.error_message().unwrap();
        assert!(message.starts_with("Failed to fetch source image"));
        assert!(message.contains("exceeds"));
    }

    #[actix_rt::test]
    async fn remove_background_matches_equivalent_edit() {
        let server = MockServer::start().await;
        mount_source_image(&server, "/photo.png").await;
        Mock::given(method("POST"))
            .and(path("/v1/images/edits"))
            .and(body_string_contains("remove background, transparent background"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{"url": "https://cdn.test/cutout.png"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let service = service_for(&server.uri());
        let image_url = HttpUrl::parse(&format!("{}/photo.png", server.uri())).unwrap();

        let removed = service.remove_background(&image_url).await;
        let edited = service
            .edit(&EditRequest::new(image_url, "remove background, transparent background"))
            .await;

        assert!(removed.success());
        assert_eq!(removed, edited);
    }
}
