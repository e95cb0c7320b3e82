//! Command-line image analysis against the Computer Vision REST API
//!
//! Takes one image reference (URL or local file), prints the service's
//! description, tags, categories, brands, objects and adult-content ratings,
//! and saves a smart-cropped thumbnail of the same image.

pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod input;
pub mod models;
pub mod report;
pub mod thumbnail;
pub mod vision;

pub use error::{Error, Result};
