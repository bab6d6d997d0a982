use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::session::VideoReport;
use crate::wordcloud::WordWeight;

pub mod formatters;

pub use formatters::*;

/// Render a report in the requested format
pub fn render(report: &VideoReport, cloud: &[WordWeight], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_as_text(report, cloud),
        OutputFormat::Json => format_as_json(report, cloud)?,
        OutputFormat::Markdown => format_as_markdown(report, cloud),
    })
}

/// Save rendered reports to file
pub fn save_to_file(reports: &[String], path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        // one JSON document per file
        OutputFormat::Json if reports.len() > 1 => format!("[\n{}\n]\n", reports.join(",\n")),
        OutputFormat::Markdown => reports.join("\n---\n\n"),
        _ => reports.join("\n"),
    };

    fs_err::write(path, content).with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

/// Print a rendered report to console
pub fn print_to_console(rendered: &str) {
    println!("{}", rendered);
}

/// Write the full transcript text of a report
pub fn save_transcript(report: &VideoReport, path: &Path) -> Result<()> {
    fs_err::write(path, &report.outcome.full_text)
        .with_context(|| format!("Failed to save transcript to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineOutcome;

    fn report(text: &str) -> VideoReport {
        VideoReport {
            video_id: "abc".to_string(),
            title: None,
            outcome: PipelineOutcome::assemble("abc", Vec::new(), text.to_string(), Vec::new(), Default::default(), false),
            related: Vec::new(),
        }
    }

    #[test]
    fn test_save_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc_transcript.txt");

        save_transcript(&report("The quick brown fox."), &path).unwrap();
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "The quick brown fox.");
    }

    #[test]
    fn test_save_json_reports_as_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        let rendered: Vec<String> = ["one", "two"]
            .iter()
            .map(|text| render(&report(text), &[], OutputFormat::Json).unwrap())
            .collect();

        save_to_file(&rendered, &path, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&fs_err::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert_eq!(parsed[1]["outcome"]["full_text"], "two");
    }
}
