use super::VisionService;
use crate::error::ServiceErrorKind;
use crate::models::{AnalysisResult, ImageData, VisualFeature};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A recorded call made against [`MockVisionClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum VisionCall {
    Analyze {
        image: ImageData,
        features: Vec<VisualFeature>,
    },
    Thumbnail {
        width: u32,
        height: u32,
        image: ImageData,
        smart_cropping: bool,
    },
}

#[derive(Clone)]
pub struct MockVisionClient {
    analysis: Arc<Mutex<Option<AnalysisResult>>>,
    thumbnail_bytes: Arc<Mutex<Vec<u8>>>,
    analyze_failure: Arc<Mutex<Option<ServiceErrorKind>>>,
    thumbnail_failure: Arc<Mutex<Option<ServiceErrorKind>>>,
    calls: Arc<Mutex<Vec<VisionCall>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            analysis: Arc::new(Mutex::new(None)),
            // Minimal JPEG SOI/EOI markers
            thumbnail_bytes: Arc::new(Mutex::new(vec![0xFF, 0xD8, 0xFF, 0xD9])),
            analyze_failure: Arc::new(Mutex::new(None)),
            thumbnail_failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_analysis(self, result: AnalysisResult) -> Self {
        *self.analysis.lock().unwrap() = Some(result);
        self
    }

    pub fn with_thumbnail(self, bytes: Vec<u8>) -> Self {
        *self.thumbnail_bytes.lock().unwrap() = bytes;
        self
    }

    pub fn with_analyze_failure(self, kind: ServiceErrorKind) -> Self {
        *self.analyze_failure.lock().unwrap() = Some(kind);
        self
    }

    pub fn with_thumbnail_failure(self, kind: ServiceErrorKind) -> Self {
        *self.thumbnail_failure.lock().unwrap() = Some(kind);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<VisionCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn analyze(
        &self,
        image: &ImageData,
        features: &[VisualFeature],
    ) -> Result<AnalysisResult> {
        self.calls.lock().unwrap().push(VisionCall::Analyze {
            image: image.clone(),
            features: features.to_vec(),
        });

        if let Some(kind) = *self.analyze_failure.lock().unwrap() {
            return Err(Error::service(kind, "mock analyze failure"));
        }

        Ok(self.analysis.lock().unwrap().clone().unwrap_or_default())
    }

    async fn thumbnail(
        &self,
        width: u32,
        height: u32,
        image: &ImageData,
        smart_cropping: bool,
    ) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(VisionCall::Thumbnail {
            width,
            height,
            image: image.clone(),
            smart_cropping,
        });

        if let Some(kind) = *self.thumbnail_failure.lock().unwrap() {
            return Err(Error::service(kind, "mock thumbnail failure"));
        }

        Ok(self.thumbnail_bytes.lock().unwrap().clone())
    }
}
