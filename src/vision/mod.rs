//! Vision service integration for image analysis and thumbnails
//!
//! Provides the interface to the Computer Vision REST API used to describe an
//! image and to produce a smart-cropped thumbnail of it.

pub mod client;
pub mod format;
pub mod mock;

pub use client::VisionClient;
pub use mock::MockVisionClient;

use crate::models::{AnalysisResult, ImageData, VisualFeature};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    async fn analyze(&self, image: &ImageData, features: &[VisualFeature])
        -> Result<AnalysisResult>;

    async fn thumbnail(
        &self,
        width: u32,
        height: u32,
        image: &ImageData,
        smart_cropping: bool,
    ) -> Result<Vec<u8>>;
}
