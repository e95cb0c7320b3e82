use super::VisionService;
use crate::error::ServiceErrorKind;
use crate::models::{AnalysisResult, ImageData, ServiceErrorBody, VisualFeature};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const API_PATH: &str = "vision/v3.2";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Authenticated Computer Vision REST client.
pub struct VisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl VisionClient {
    pub fn new(endpoint: &reqwest::Url, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new_with_client(endpoint, api_key, timeout, client))
    }

    pub fn new_with_client(
        endpoint: &reqwest::Url,
        api_key: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: endpoint.as_str().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn request(&self, operation: &str, image: &ImageData) -> RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, API_PATH, operation);
        let builder = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key);

        match image {
            ImageData::Url(url) => builder.json(&serde_json::json!({ "url": url })),
            ImageData::Bytes(bytes) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes.clone()),
        }
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send {} request to vision service: {}", operation, e);
            Error::service(ServiceErrorKind::Network, e.to_string())
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            "Vision service {} error (status {}): {}",
            operation,
            status,
            error_text
        );

        let message = match serde_json::from_str::<ServiceErrorBody>(&error_text) {
            Ok(body) => format!(
                "status {}: {} ({})",
                status,
                body.detail().message,
                body.detail().code
            ),
            Err(_) if error_text.trim().is_empty() => format!("status {}", status),
            Err(_) => format!("status {}: {}", status, error_text.trim()),
        };

        Err(Error::service(ServiceErrorKind::from_status(status), message))
    }
}

#[async_trait]
impl VisionService for VisionClient {
    async fn analyze(
        &self,
        image: &ImageData,
        features: &[VisualFeature],
    ) -> Result<AnalysisResult> {
        tracing::debug!("Sending analyze request for {}", image.describe());

        let builder = self
            .request("analyze", image)
            .query(&[("visualFeatures", VisualFeature::join(features))]);
        let response = self.send("analyze", builder).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::service(ServiceErrorKind::Network, e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse analyze response: {}\nBody: {}", e, body);
            Error::service(
                ServiceErrorKind::InvalidResponse,
                format!("Failed to parse analyze response: {}", e),
            )
        })
    }

    async fn thumbnail(
        &self,
        width: u32,
        height: u32,
        image: &ImageData,
        smart_cropping: bool,
    ) -> Result<Vec<u8>> {
        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 {
                return Err(Error::service(
                    ServiceErrorKind::InvalidRequest,
                    format!("thumbnail {} must be greater than zero", name),
                ));
            }
        }

        tracing::debug!(
            "Sending thumbnail request ({}x{}, smart cropping: {}) for {}",
            width,
            height,
            smart_cropping,
            image.describe()
        );

        let builder = self.request("generateThumbnail", image).query(&[
            ("width", width.to_string()),
            ("height", height.to_string()),
            ("smartCropping", smart_cropping.to_string()),
        ]);
        let response = self.send("generateThumbnail", builder).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::service(ServiceErrorKind::Network, e.to_string()))?;
        if bytes.is_empty() {
            return Err(Error::service(
                ServiceErrorKind::InvalidResponse,
                "thumbnail response was empty",
            ));
        }

        Ok(bytes.to_vec())
    }
}
