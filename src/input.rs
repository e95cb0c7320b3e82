//! Classification of the user-supplied image reference.

use crate::models::ImageSource;
use crate::{Error, Result};
use std::path::PathBuf;

pub const INVALID_INPUT_MESSAGE: &str = "You must provide a valid image URL or file path.";

/// Decide whether `raw` names a remote image, a local file, or neither.
///
/// URLs win over paths, so the filesystem is only consulted when the input
/// does not parse as an absolute URL with a host.
pub fn classify(raw: &str) -> Result<ImageSource> {
    let trimmed = strip_quotes(raw.trim());
    if trimmed.is_empty() {
        return Err(Error::Input(INVALID_INPUT_MESSAGE.to_string()));
    }

    if let Ok(url) = reqwest::Url::parse(trimmed) {
        if url.has_host() {
            return Ok(ImageSource::Remote(url));
        }
    }

    let path = PathBuf::from(trimmed);
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(ImageSource::Local(path)),
        _ => {
            tracing::debug!("Input is neither a URL nor an existing file: {}", trimmed);
            Err(Error::Input(INVALID_INPUT_MESSAGE.to_string()))
        }
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(value)
}
