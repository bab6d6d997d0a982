use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::pipeline::SummaryResult;
use crate::profile::ProfileStore;
use crate::session::VideoReport;
use crate::utils::{format_timestamp, watch_url};
use crate::wordcloud::WordWeight;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a VideoReport,
    summary_text: String,
    word_cloud: &'a [WordWeight],
}

fn keyword_line(report: &VideoReport) -> String {
    if report.outcome.keywords.is_empty() {
        "(none)".to_string()
    } else {
        report
            .outcome
            .keywords
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Format a report as plain text
pub fn format_as_text(report: &VideoReport, cloud: &[WordWeight]) -> String {
    let outcome = &report.outcome;
    let mut out = String::new();

    let _ = writeln!(out, "Video: {} ({})", report.display_title(), watch_url(&report.video_id));
    let _ = write!(out, "Status: {}", outcome.status);
    if outcome.cancelled {
        out.push_str(" (cancelled)");
    }
    out.push('\n');
    if let Some(last) = outcome.segments.last() {
        let _ = writeln!(out, "Length: {}", format_timestamp(last.end()));
    }

    if !outcome.summaries.is_empty() {
        out.push_str("\nSummary:\n");
        for summary in &outcome.summaries {
            match summary {
                SummaryResult::Success { chunk_index, text } => {
                    let _ = writeln!(out, "Part {}: {}", chunk_index + 1, text);
                }
                SummaryResult::Failed { chunk_index, reason } => {
                    let _ = writeln!(out, "Part {}: [not summarized: {}]", chunk_index + 1, reason);
                }
            }
        }
    }

    let _ = writeln!(out, "\nKeywords: {}", keyword_line(report));

    if !cloud.is_empty() {
        let words: Vec<String> = cloud.iter().map(|w| format!("{} ({})", w.word, w.count)).collect();
        let _ = writeln!(out, "Top words: {}", words.join(", "));
    }

    if !report.related.is_empty() {
        out.push_str("\nRelated videos:\n");
        for video in &report.related {
            let _ = writeln!(out, "  • {} - {}", video.title, video.url());
        }
    }

    out
}

/// Format a report as JSON
pub fn format_as_json(report: &VideoReport, cloud: &[WordWeight]) -> Result<String> {
    let json = JsonReport {
        report,
        summary_text: report.outcome.summary_text(),
        word_cloud: cloud,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Format a report as Markdown
pub fn format_as_markdown(report: &VideoReport, cloud: &[WordWeight]) -> String {
    let outcome = &report.outcome;
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", report.display_title());
    let _ = writeln!(out, "- Video: <{}>", watch_url(&report.video_id));
    let _ = writeln!(out, "- Status: {}", outcome.status);
    let failed: Vec<String> = outcome.failed_chunks().iter().map(|i| (i + 1).to_string()).collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "- Parts not summarized: {}", failed.join(", "));
    }

    let summaries = outcome.successful_summaries();
    if !summaries.is_empty() {
        out.push_str("\n## Summary\n\n");
        for summary in &outcome.summaries {
            if let SummaryResult::Success { chunk_index, text } = summary {
                let _ = writeln!(out, "**Part {}:** {}\n", chunk_index + 1, text);
            }
        }
    }

    out.push_str("\n## Keywords\n\n");
    let _ = writeln!(out, "{}", keyword_line(report));

    if !cloud.is_empty() {
        out.push_str("\n| Word | Count | Weight |\n|---|---|---|\n");
        for w in cloud {
            let _ = writeln!(out, "| {} | {} | {:.2} |", w.word, w.count, w.weight);
        }
    }

    if !report.related.is_empty() {
        out.push_str("\n## Related videos\n\n");
        for video in &report.related {
            let _ = writeln!(out, "- [{}]({})", video.title, video.url());
        }
    }

    out
}

/// List the videos saved in a profile
pub fn format_profile(profile: &dyn ProfileStore) -> String {
    let videos = profile.list();
    let mut out = format!("Profile: {}\n", profile.name());

    if videos.is_empty() {
        out.push_str("  No saved videos\n");
        return out;
    }

    for video in videos {
        let _ = writeln!(
            out,
            "  • {} ({}) - {} summaries, saved {}",
            video.title,
            video.video_id,
            video.summaries.len(),
            video.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}
