//! Thumbnail generation and persistence
//!
//! Requests a smart-cropped thumbnail from the vision service and writes it to
//! the configured destination, replacing any previous file.

use crate::models::ImageData;
use crate::vision::VisionService;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const THUMBNAIL_WIDTH: u32 = 100;
pub const THUMBNAIL_HEIGHT: u32 = 100;

pub struct ThumbnailGenerator {
    output_path: PathBuf,
    width: u32,
    height: u32,
    smart_cropping: bool,
}

impl ThumbnailGenerator {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            width: THUMBNAIL_WIDTH,
            height: THUMBNAIL_HEIGHT,
            smart_cropping: true,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Generate the thumbnail and return the path it was saved to.
    pub async fn generate(&self, vision: &dyn VisionService, image: &ImageData) -> Result<PathBuf> {
        self.prepare_destination()
            .await
            .map_err(Error::thumbnail)?;

        let bytes = vision
            .thumbnail(self.width, self.height, image, self.smart_cropping)
            .await
            .map_err(Error::thumbnail)?;
        tracing::info!(
            "Received {}x{} thumbnail ({} bytes)",
            self.width,
            self.height,
            bytes.len()
        );

        self.save(bytes).await.map_err(Error::thumbnail)?;
        Ok(self.output_path.clone())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Make sure the destination can be written before calling the service.
    async fn prepare_destination(&self) -> Result<()> {
        let parent = self.parent_dir();
        let destination = self.output_path.clone();

        tokio::task::spawn_blocking(move || Self::prepare_destination_sync(&parent, &destination))
            .await
            .map_err(|e| join_error("Thumbnail destination check", e))?
    }

    fn prepare_destination_sync(parent: &Path, destination: &Path) -> Result<()> {
        if destination.is_dir() {
            return Err(Error::Io(std::io::Error::other(format!(
                "{} is a directory",
                destination.display()
            ))));
        }

        std::fs::create_dir_all(parent)?;
        // Scratch file is removed on drop.
        NamedTempFile::new_in(parent)?;
        Ok(())
    }

    async fn save(&self, bytes: Vec<u8>) -> Result<()> {
        let parent = self.parent_dir();
        let destination = self.output_path.clone();

        tokio::task::spawn_blocking(move || Self::save_sync(&parent, &destination, &bytes))
            .await
            .map_err(|e| join_error("Thumbnail write", e))?
    }

    fn save_sync(parent: &Path, destination: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(destination).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn join_error(task: &str, e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(format!(
        "{} task join error: {}",
        task, e
    )))
}
