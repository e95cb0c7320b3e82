/// Image formats accepted by the analyze and thumbnail endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),
        [0x47, 0x49, 0x46, 0x38, ..] => Some(ImageFormat::Gif),
        [0x42, 0x4D, ..] => Some(ImageFormat::Bmp),
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
