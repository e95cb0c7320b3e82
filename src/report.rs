//! Console rendering of analysis results.

use crate::models::AnalysisResult;
use std::fmt::{self, Write as _};

pub const NO_RESULT_MESSAGE: &str = "Image analysis failed or returned null results.";
pub const NO_DESCRIPTION: &str = "No description available";

/// Formats a 0..1 confidence as a percentage with two decimals.
pub fn percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Render the full report, or the failure line when there is no result.
pub fn render(result: Option<&AnalysisResult>) -> String {
    let Some(analysis) = result else {
        return format!("{}\n", NO_RESULT_MESSAGE);
    };

    let mut out = String::new();
    write_sections(&mut out, analysis).expect("writing to a String cannot fail");
    out
}

fn write_sections(out: &mut String, analysis: &AnalysisResult) -> fmt::Result {
    writeln!(out, "Image analysis results:")?;

    match analysis.primary_caption() {
        Some(caption) => writeln!(
            out,
            "Description: {} (confidence: {})",
            caption.text,
            percent(caption.confidence)
        )?,
        None => writeln!(out, "Description: {}", NO_DESCRIPTION)?,
    }

    writeln!(out, "Tags:")?;
    for tag in &analysis.tags {
        writeln!(out, "- {}", tag.name)?;
    }

    writeln!(out, "Categories:")?;
    for category in &analysis.categories {
        writeln!(
            out,
            "- {} (confidence: {})",
            category.name,
            percent(category.score)
        )?;
    }

    writeln!(out, "Brands:")?;
    for brand in &analysis.brands {
        writeln!(
            out,
            "- {} (confidence: {})",
            brand.name,
            percent(brand.confidence)
        )?;
    }

    writeln!(out, "Objects in image:")?;
    for object in &analysis.objects {
        writeln!(
            out,
            "- {} (confidence: {})",
            object.label,
            percent(object.confidence)
        )?;
    }

    writeln!(out, "Ratings:")?;
    writeln!(out, "- Adult: {}", analysis.adult.is_adult_content)?;
    writeln!(out, "- Racy: {}", analysis.adult.is_racy_content)?;
    writeln!(out, "- Gore: {}", analysis.adult.is_gory_content)
}

pub fn write_report<W: std::io::Write>(
    out: &mut W,
    result: Option<&AnalysisResult>,
) -> std::io::Result<()> {
    out.write_all(render(result).as_bytes())?;
    out.flush()
}
