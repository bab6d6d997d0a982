use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescript::cli::{Cli, Commands, OutputFormat};
use tubescript::config::Config;
use tubescript::directory::{VideoDirectory, YoutubeDataApi};
use tubescript::keywords::StopWordExtractor;
use tubescript::output;
use tubescript::pipeline::{AnalysisPipeline, OutcomeStatus, PipelineSettings};
use tubescript::profile::InMemoryProfile;
use tubescript::session::{Session, VideoReport};
use tubescript::summarize::HuggingFaceSummarizer;
use tubescript::transcript::{JsonFileSource, TranscriptSource, YoutubeCaptionSource};
use tubescript::translate::{translate_long, GoogleTranslator};
use tubescript::utils::{self, extract_video_id, transcript_filename};
use tubescript::wordcloud::word_weights;
use tubescript::TubescriptError;

/// Words listed in the word cloud section of a report
const WORD_CLOUD_SIZE: usize = 20;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "tubescript=debug" } else { "tubescript=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            inputs,
            output,
            format,
            chunk_size,
            boundary,
            concurrency,
            transcript_out,
            transcript_file,
            translate,
            no_related,
        } => {
            let video_ids = resolve_inputs(&inputs, transcript_file.as_deref())?;

            let mut config = Config::load().await?;
            if let Some(size) = chunk_size {
                config.pipeline.max_chunk_size = size;
            }
            if let Some(boundary) = boundary {
                config.pipeline.boundary = boundary;
            }
            if let Some(concurrency) = concurrency {
                config.pipeline.concurrency = concurrency;
            }
            config.validate()?;
            let format = format.unwrap_or(config.app.default_output_format);

            let source: Arc<dyn TranscriptSource> = match &transcript_file {
                Some(path) => Arc::new(JsonFileSource::new(path)),
                None => {
                    // Check for required external dependencies (non-fatal)
                    let missing_deps = utils::check_dependencies().await;
                    if !missing_deps.is_empty() {
                        eprintln!("{} Dependency check warnings:", style("⚠️").yellow());
                        for dep in missing_deps {
                            eprintln!("   • {}", dep);
                        }
                    }
                    Arc::new(YoutubeCaptionSource::new(config.services.caption_languages.clone()))
                }
            };

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let progress = ProgressBar::new_spinner();
                progress.set_style(
                    ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg} {pos}/{len}")?,
                );
                progress.enable_steady_tick(Duration::from_millis(120));
                progress
            };

            let pipeline = AnalysisPipeline::new(
                source,
                Arc::new(HuggingFaceSummarizer::from_config(&config.services)),
                Arc::new(StopWordExtractor::new(config.pipeline.keyword_case)),
                PipelineSettings::from(&config.pipeline),
            )
            .with_progress(progress.clone());

            let mut session = Session::new(pipeline, Box::new(InMemoryProfile::new(config.app.profile_name.clone())));
            if !no_related {
                match config.services.youtube_api_key() {
                    Some(key) => {
                        let directory: Arc<dyn VideoDirectory> = Arc::new(YoutubeDataApi::new(key));
                        session = session.with_directory(directory, config.app.related_videos);
                    }
                    None => {
                        let err = TubescriptError::MissingApiKey {
                            env_var: config.services.youtube_api_key_env.clone(),
                        };
                        tracing::warn!("{}, skipping titles and related videos", err);
                    }
                }
            }

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling analysis");
                    ctrl_c.cancel();
                }
            });

            let mut rendered = Vec::new();
            let mut failures = 0;
            for video_id in &video_ids {
                if cancel.is_cancelled() {
                    break;
                }

                let report = match session.submit(video_id, &cancel).await {
                    Ok(report) => report,
                    Err(e) => {
                        progress.suspend(|| eprintln!("{} {}", style("✗").red(), e));
                        failures += 1;
                        continue;
                    }
                };

                let cloud = word_weights(
                    &report.outcome.full_text,
                    &report.outcome.keywords,
                    config.pipeline.keyword_case,
                    WORD_CLOUD_SIZE,
                );
                let content = output::render(&report, &cloud, format)?;
                progress.suspend(|| report_status(&report));

                if output.is_some() {
                    rendered.push(content);
                } else {
                    progress.suspend(|| output::print_to_console(&content));
                }

                if let Some(target) = &transcript_out {
                    if !report.outcome.full_text.is_empty() {
                        let path = transcript_path(target.as_deref(), video_id);
                        output::save_transcript(&report, &path)?;
                        progress.suspend(|| println!("Transcript saved to: {}", path.display()));
                    }
                }

                if translate && !report.outcome.full_text.is_empty() && !report.outcome.cancelled {
                    progress.set_message("Translating transcript...");
                    let translator = GoogleTranslator::new(config.services.translate_api_url.clone());
                    let services = &config.services;
                    match translate_long(
                        &translator,
                        &report.outcome.full_text,
                        &services.translate_source,
                        &services.translate_target,
                        &cancel,
                    )
                    .await
                    {
                        Ok(translated) => progress.suspend(|| {
                            println!("Translation ({}):\n{}\n", services.translate_target, translated)
                        }),
                        Err(e) => progress.suspend(|| eprintln!("{} Translation failed: {}", style("⚠️").yellow(), e)),
                    }
                }
            }
            progress.finish_and_clear();

            if let Some(path) = &output {
                if !rendered.is_empty() {
                    output::save_to_file(&rendered, path, format)?;
                    println!("Reports saved to: {}", path.display());
                }
            }

            if format == OutputFormat::Text && !cli.quiet {
                print!("\n{}", output::format_profile(session.profile()));
            }

            if cancel.is_cancelled() {
                bail!("Analysis cancelled");
            }
            if failures > 0 {
                bail!("{} of {} videos could not be analyzed", failures, video_ids.len());
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                config.interactive_setup().await?;
            }
        }
    }

    Ok(())
}

/// Video ids to analyze, in order. Invalid inputs are reported and skipped.
///
/// A transcript file stands for a single video, so it takes at most one input.
fn resolve_inputs(inputs: &[String], transcript_file: Option<&Path>) -> Result<Vec<String>> {
    if transcript_file.is_some() && inputs.len() > 1 {
        bail!(TubescriptError::InvalidConfig(format!(
            "--transcript-file holds one video's transcript but {} videos were given",
            inputs.len()
        )));
    }

    if inputs.is_empty() {
        if let Some(path) = transcript_file {
            let id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "transcript".to_string());
            return Ok(vec![id]);
        }
    }

    let mut video_ids = Vec::new();
    for input in inputs {
        match extract_video_id(input) {
            Some(id) => video_ids.push(id),
            None => eprintln!("{} {}", style("✗").red(), TubescriptError::InvalidVideoUrl(input.clone())),
        }
    }

    if video_ids.is_empty() {
        bail!(TubescriptError::InvalidVideoUrl(inputs.join(" ")));
    }
    Ok(video_ids)
}

fn transcript_path(target: Option<&Path>, video_id: &str) -> PathBuf {
    match target {
        Some(path) if path.is_dir() => path.join(transcript_filename(video_id)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(transcript_filename(video_id)),
    }
}

fn report_status(report: &VideoReport) {
    let outcome = &report.outcome;
    let failed = outcome.failed_chunks().len();

    match outcome.status {
        OutcomeStatus::Complete if failed == 0 => {
            eprintln!("{} {}", style("✓").green(), report.display_title());
        }
        OutcomeStatus::Complete => eprintln!(
            "{} {} ({} of {} parts not summarized)",
            style("!").yellow(),
            report.display_title(),
            failed,
            outcome.summaries.len()
        ),
        OutcomeStatus::PartialFailure if outcome.cancelled => {
            eprintln!("{} {} (cancelled)", style("!").yellow(), report.display_title());
        }
        OutcomeStatus::PartialFailure => {
            eprintln!("{} {} (no part could be summarized)", style("✗").red(), report.display_title());
        }
        OutcomeStatus::Empty => {
            eprintln!("{} {} (transcript has no text)", style("!").yellow(), report.display_title());
        }
    }
}
