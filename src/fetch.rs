//! Client-side download of remote images
//!
//! Used when remote images are fetched by this program and streamed to the
//! service instead of letting the service download the URL itself.

use crate::vision::format::detect_image_format;
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Upper bound on image size accepted by the analyze endpoint.
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

pub struct ImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub async fn fetch(&self, url: &reqwest::Url) -> Result<Vec<u8>> {
        tracing::debug!("Downloading image from {}", url);

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::error!("Failed to download {}: {}", url, e);
            Error::Fetch(format!("{}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(self.too_large(url));
            }
        }

        let declared_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("image/"));

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(Error::Fetch(format!("{} returned an empty body", url)));
        }

        if declared_image != Some(true) && detect_image_format(&bytes).is_none() {
            return Err(Error::Fetch(format!("{} did not return image content", url)));
        }

        tracing::info!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }

    fn too_large(&self, url: &reqwest::Url) -> Error {
        Error::Fetch(format!(
            "{} exceeds the {} byte image limit",
            url, self.max_bytes
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer, p: &str) -> reqwest::Url {
        reqwest::Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_image_bytes() {
        let server = MockServer::start().await;
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png.clone()),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();
        let bytes = fetcher.fetch(&url(&server, "/cat.png")).await.unwrap();
        assert_eq!(bytes, png);
    }

    #[tokio::test]
    async fn test_sniffs_format_without_image_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();
        assert!(fetcher.fetch(&url(&server, "/photo")).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_image_content_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>not an image</html>"),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&url(&server, "/page")).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.to_string().contains("did not return image content"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&url(&server, "/missing.jpg")).await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0u8; 64]),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_secs(5))
            .unwrap()
            .with_max_bytes(16);
        let err = fetcher.fetch(&url(&server, "/big.jpg")).await.unwrap_err();
        assert!(err.to_string().contains("byte image limit"));
    }
}
