//! Application orchestration for a single analyze-and-thumbnail run.

use crate::config::Settings;
use crate::fetch::ImageFetcher;
use crate::input;
use crate::models::{AnalysisResult, ImageData, ImageSource, VisualFeature};
use crate::report;
use crate::thumbnail::ThumbnailGenerator;
use crate::vision::{VisionClient, VisionService};
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Analyzes one image and saves its thumbnail.
pub struct App {
    vision: Box<dyn VisionService>,
    fetcher: Option<ImageFetcher>,
    thumbnails: ThumbnailGenerator,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub vision: Box<dyn VisionService>,
    /// When set, remote images are downloaded locally and sent as bytes.
    pub fetcher: Option<ImageFetcher>,
}

/// Independent outcomes of the analysis and thumbnail steps.
#[derive(Debug)]
pub struct RunReport {
    pub source: ImageSource,
    pub analysis: Result<AnalysisResult>,
    pub thumbnail: Result<PathBuf>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.analysis.is_ok() && self.thumbnail.is_ok()
    }

    /// Zero when both steps succeeded; otherwise the code of the first failure.
    pub fn exit_code(&self) -> i32 {
        match (&self.analysis, &self.thumbnail) {
            (Err(e), _) | (Ok(_), Err(e)) => e.exit_code(),
            (Ok(_), Ok(_)) => 0,
        }
    }
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, thumbnails: ThumbnailGenerator) -> Self {
        Self {
            vision: services.vision,
            fetcher: services.fetcher,
            thumbnails,
        }
    }

    /// Construct an app from validated settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let vision = VisionClient::new(
            &settings.endpoint,
            settings.key.clone(),
            settings.request_timeout,
        )?;

        let fetcher = if settings.fetch_remote_images {
            info!("Remote images will be downloaded before analysis");
            Some(ImageFetcher::new(settings.request_timeout)?)
        } else {
            None
        };

        info!(
            "Thumbnails will be saved to {}",
            settings.thumbnail_path.display()
        );

        Ok(Self::with_services(
            AppServices {
                vision: Box::new(vision),
                fetcher,
            },
            ThumbnailGenerator::new(settings.thumbnail_path.clone()),
        ))
    }

    /// Classify `raw_input`, analyze it, print the report to `out`, then
    /// generate the thumbnail.
    ///
    /// Only input rejection and failures writing to `out` are returned as
    /// errors; the two service steps report through [`RunReport`].
    pub async fn run<W: Write>(&self, raw_input: &str, out: &mut W) -> Result<RunReport> {
        let source = input::classify(raw_input)?;
        info!("Analyzing {}", source);

        let analysis = self.analyze(&source).await;
        match &analysis {
            Ok(result) => report::write_report(out, Some(result))?,
            Err(e) => {
                error!("Image analysis failed: {}", e);
                writeln!(out, "{}", e)?;
                report::write_report(out, None)?;
            }
        }

        writeln!(out, "Generating thumbnail...")?;
        let thumbnail = self.generate_thumbnail(&source).await;
        match &thumbnail {
            Ok(path) => writeln!(out, "Thumbnail saved in {}", path.display())?,
            Err(e) => {
                error!("{}", e);
                writeln!(out, "{}", e)?;
            }
        }
        out.flush()?;

        Ok(RunReport {
            source,
            analysis,
            thumbnail,
        })
    }

    async fn analyze(&self, source: &ImageSource) -> Result<AnalysisResult> {
        let payload = match (source, &self.fetcher) {
            (ImageSource::Remote(url), Some(fetcher)) => {
                ImageData::Bytes(fetcher.fetch(url).await?)
            }
            (ImageSource::Remote(url), None) => ImageData::Url(url.to_string()),
            (ImageSource::Local(path), _) => ImageData::Bytes(read_local(path).await?),
        };

        let result = self
            .vision
            .analyze(&payload, &VisualFeature::DEFAULT_SET)
            .await?;
        info!(
            "Analysis returned {} tags, {} categories, {} brands, {} objects",
            result.tags.len(),
            result.categories.len(),
            result.brands.len(),
            result.objects.len()
        );
        Ok(result)
    }

    async fn generate_thumbnail(&self, source: &ImageSource) -> Result<PathBuf> {
        let payload = match source {
            ImageSource::Remote(url) => ImageData::Url(url.to_string()),
            ImageSource::Local(path) => {
                ImageData::Bytes(read_local(path).await.map_err(Error::thumbnail)?)
            }
        };

        self.thumbnails.generate(self.vision.as_ref(), &payload).await
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;
    info!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::{App, AppServices};
    use crate::error::ServiceErrorKind;
    use crate::models::{AnalysisResult, Caption, ImageData, ImageDescription, VisualFeature};
    use crate::thumbnail::ThumbnailGenerator;
    use crate::vision::mock::VisionCall;
    use crate::vision::MockVisionClient;
    use crate::Error;
    use std::fs;
    use std::path::Path;

    fn build_test_app(vision: &MockVisionClient, output: &Path) -> App {
        App::with_services(
            AppServices {
                vision: Box::new(vision.clone()),
                fetcher: None,
            },
            ThumbnailGenerator::new(output.to_path_buf()),
        )
    }

    fn captioned(text: &str) -> AnalysisResult {
        AnalysisResult {
            description: ImageDescription {
                captions: vec![Caption {
                    text: text.to_string(),
                    confidence: 0.5,
                }],
            },
            ..AnalysisResult::default()
        }
    }

    #[tokio::test]
    async fn test_remote_input_passes_url_to_both_calls() {
        let dir = tempfile::tempdir().unwrap();
        let vision = MockVisionClient::new().with_analysis(captioned("a cat"));
        let app = build_test_app(&vision, &dir.path().join("thumb.jpg"));

        let mut out = Vec::new();
        let report = app
            .run("https://example.com/cat.jpg", &mut out)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);

        let url = ImageData::Url("https://example.com/cat.jpg".to_string());
        assert_eq!(
            vision.get_calls(),
            vec![
                VisionCall::Analyze {
                    image: url.clone(),
                    features: VisualFeature::DEFAULT_SET.to_vec(),
                },
                VisionCall::Thumbnail {
                    width: 100,
                    height: 100,
                    image: url,
                    smart_cropping: true,
                },
            ]
        );

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Description: a cat"));
        assert!(text.contains("Generating thumbnail..."));
        assert!(text.contains("Thumbnail saved in"));
    }

    #[tokio::test]
    async fn test_local_input_streams_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.png");
        let bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x01, 0x02];
        fs::write(&image, &bytes).unwrap();

        let vision = MockVisionClient::new();
        let app = build_test_app(&vision, &dir.path().join("thumb.jpg"));

        let mut out = Vec::new();
        app.run(image.to_str().unwrap(), &mut out).await.unwrap();

        for call in vision.get_calls() {
            match call {
                VisionCall::Analyze { image, .. } | VisionCall::Thumbnail { image, .. } => {
                    assert_eq!(image, ImageData::Bytes(bytes.clone()))
                }
            }
        }
        assert_eq!(vision.get_call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let vision = MockVisionClient::new();
        let app = build_test_app(&vision, &dir.path().join("thumb.jpg"));

        for input in ["", "   ", "/tmp/doesnotexist-cv-analyzer.png"] {
            let mut out = Vec::new();
            let err = app.run(input, &mut out).await.unwrap_err();
            assert!(matches!(err, Error::Input(_)));
            assert!(out.is_empty());
        }
        assert_eq!(vision.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_thumbnail_attempted_after_analysis_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("thumb.jpg");
        let vision = MockVisionClient::new()
            .with_analyze_failure(ServiceErrorKind::Unauthorized)
            .with_thumbnail(vec![1, 2, 3]);
        let app = build_test_app(&vision, &output);

        let mut out = Vec::new();
        let report = app
            .run("https://example.com/cat.jpg", &mut out)
            .await
            .unwrap();

        assert!(report.analysis.is_err());
        assert!(report.thumbnail.is_ok());
        assert_eq!(report.exit_code(), 5);
        assert_eq!(fs::read(&output).unwrap(), vec![1, 2, 3]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("authentication failed"));
        assert!(text.contains("Image analysis failed or returned null results."));
        assert!(text.contains("Thumbnail saved in"));
    }

    #[tokio::test]
    async fn test_thumbnail_failure_does_not_hide_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let vision = MockVisionClient::new()
            .with_analysis(captioned("a dog"))
            .with_thumbnail_failure(ServiceErrorKind::RateLimited);
        let app = build_test_app(&vision, &dir.path().join("thumb.jpg"));

        let mut out = Vec::new();
        let report = app
            .run("https://example.com/dog.jpg", &mut out)
            .await
            .unwrap();

        assert!(report.analysis.is_ok());
        assert_eq!(report.exit_code(), 6);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Description: a dog"));
        assert!(text.contains("Error generating thumbnail:"));
    }
}
