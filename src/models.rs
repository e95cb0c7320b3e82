//! Data models and structures
//!
//! Defines the image reference types handed to the vision service and the
//! analysis payload it returns.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// A classified image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(reqwest::Url),
    Local(PathBuf),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Image payload for a single service request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    /// The service downloads the image itself.
    Url(String),
    /// Raw image bytes streamed in the request body.
    Bytes(Vec<u8>),
}

impl ImageData {
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => format!("url {}", url),
            Self::Bytes(bytes) => format!("{} bytes", bytes.len()),
        }
    }
}

/// Analysis categories that can be requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualFeature {
    Description,
    Tags,
    Categories,
    Brands,
    Objects,
    Adult,
}

impl VisualFeature {
    /// Feature set requested on every analysis.
    pub const DEFAULT_SET: [VisualFeature; 6] = [
        VisualFeature::Description,
        VisualFeature::Tags,
        VisualFeature::Categories,
        VisualFeature::Brands,
        VisualFeature::Objects,
        VisualFeature::Adult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Tags => "Tags",
            Self::Categories => "Categories",
            Self::Brands => "Brands",
            Self::Objects => "Objects",
            Self::Adult => "Adult",
        }
    }

    /// Comma-separated form used in the `visualFeatures` query parameter.
    pub fn join(features: &[VisualFeature]) -> String {
        features
            .iter()
            .map(VisualFeature::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

// Analyze API response models
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub description: ImageDescription,
    #[serde(default)]
    pub tags: Vec<ImageTag>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub brands: Vec<DetectedBrand>,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub adult: AdultInfo,
}

impl AnalysisResult {
    /// The first caption, if the service returned any.
    pub fn primary_caption(&self) -> Option<&Caption> {
        self.description.captions.first()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDescription {
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Caption {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageTag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectedBrand {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectedObject {
    #[serde(rename = "object")]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdultInfo {
    #[serde(default)]
    pub is_adult_content: bool,
    #[serde(default)]
    pub is_racy_content: bool,
    #[serde(default)]
    pub is_gory_content: bool,
}

/// Error envelope returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServiceErrorBody {
    Wrapped { error: ServiceErrorDetail },
    Flat(ServiceErrorDetail),
}

#[derive(Debug, Deserialize)]
pub struct ServiceErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServiceErrorBody {
    pub fn detail(&self) -> &ServiceErrorDetail {
        match self {
            Self::Wrapped { error } => error,
            Self::Flat(detail) => detail,
        }
    }
}
