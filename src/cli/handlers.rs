//! Command handlers: corpus discovery, batch execution, report output

use super::commands::{CoverageArgs, OutputFormatArg, ProcessArgs};
use crate::annotations::{IndexParser, InMemoryAnnotationIndex};
use crate::classifier::FileDescriptor;
use crate::config::CorpusmillConfig;
use crate::coverage::CoverageAnalyzer;
use crate::fs::RealFileSource;
use crate::pipeline::{BatchOrchestrator, ProgressEvent, ProgressHandler};
use crate::sink::{JsonlSink, RecordIdentity, RecordSink};
use crate::stats::StatsReport;
use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Filename of annotation index files inside the corpus.
const INDEX_FILE_NAME: &str = "index_.txt";

pub async fn handle_process(args: &ProcessArgs, quiet: bool) -> i32 {
    match run_process(args, quiet).await {
        Ok(()) => 0,
        Err(err) => {
            error!("Processing failed: {:#}", err);
            2
        }
    }
}

pub async fn handle_coverage(args: &CoverageArgs) -> i32 {
    match run_coverage(args).await {
        Ok(()) => 0,
        Err(err) => {
            error!("Coverage analysis failed: {:#}", err);
            2
        }
    }
}

async fn run_process(args: &ProcessArgs, quiet: bool) -> Result<()> {
    let mut config = CorpusmillConfig::default();
    if let Some(concurrency) = args.concurrency {
        config.concurrency_limit = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.per_file_timeout_secs = timeout;
    }

    let (index, parse_errors) = load_annotation_index(&args.root)?;
    for parse_error in &parse_errors {
        warn!("{}", parse_error);
    }

    let descriptors = discover_corpus(&args.root, &index)?;
    if descriptors.is_empty() {
        bail!("no files found under {}", args.root.display());
    }
    info!(
        files = descriptors.len(),
        annotations = index.len(),
        "Corpus discovered"
    );

    let mut orchestrator = BatchOrchestrator::new(
        &config,
        Arc::new(index),
        Arc::new(RealFileSource::new()),
    )?;

    let bar = if !quiet && atty::is(atty::Stream::Stderr) {
        let bar = ProgressBar::new(descriptors.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        orchestrator = orchestrator.with_progress(Arc::new(BarHandler { bar: bar.clone() }));
        Some(bar)
    } else {
        None
    };

    // Ctrl-C lets running files finish and drops the queued remainder.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, draining running files");
            signal_cancel.cancel();
        }
    });

    let results = orchestrator
        .process_batch(descriptors.clone(), &cancel)
        .await?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let mut stats = StatsReport::new();
    for (descriptor, result) in descriptors.iter().zip(results.iter()) {
        stats.add_result(&descriptor.path, result);
    }

    if !args.dry_run {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| args.root.join("records.jsonl"));
        let sink = JsonlSink::create(&output)?;
        for (descriptor, result) in descriptors.iter().zip(results.iter()) {
            let identity = RecordIdentity::new(&descriptor.path, &result.content);
            sink.accept(&identity, result).await?;
        }
        sink.flush()?;
        info!(output = %output.display(), records = results.len(), "Records written");
    }

    match args.format {
        OutputFormatArg::Human => println!("{}", stats.render()),
        OutputFormatArg::Json => println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?
        ),
    }

    Ok(())
}

async fn run_coverage(args: &CoverageArgs) -> Result<()> {
    let mut analyzer = CoverageAnalyzer::new();

    for path in walk_files(&args.root)? {
        let relative = path
            .strip_prefix(&args.root)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();

        if path.file_name().and_then(|n| n.to_str()) == Some(INDEX_FILE_NAME) {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            analyzer.add_index_content(&path, &content);
        } else {
            analyzer.add_corpus_file(&relative);
        }
    }

    let report = analyzer.report();
    let rendered = match args.format {
        OutputFormatArg::Human => report.render(),
        OutputFormatArg::Json => {
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), "Coverage report written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Finds and parses every annotation index under the corpus root.
fn load_annotation_index(root: &Path) -> Result<(InMemoryAnnotationIndex, Vec<String>)> {
    let mut index = InMemoryAnnotationIndex::new();
    let mut parser = IndexParser::new();

    for path in walk_files(root)? {
        if path.file_name().and_then(|n| n.to_str()) != Some(INDEX_FILE_NAME) {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        for (filename, annotation) in parser.parse_str(&content, &path) {
            index.insert(filename, annotation);
        }
    }

    Ok((index, parser.errors().to_vec()))
}

/// Builds descriptors for every corpus file (annotation indexes excluded).
fn discover_corpus(root: &Path, index: &InMemoryAnnotationIndex) -> Result<Vec<FileDescriptor>> {
    let mut descriptors = Vec::new();

    for path in walk_files(root)? {
        if path.file_name().and_then(|n| n.to_str()) == Some(INDEX_FILE_NAME) {
            continue;
        }
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        descriptors.push(FileDescriptor {
            has_prior_annotation: index.contains(&path),
            declared_mime: None,
            size,
            path,
        });
    }

    descriptors.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(descriptors)
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("corpus root does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).git_ignore(true).build() {
        match entry {
            Ok(entry) => {
                if entry
                    .file_type()
                    .map(|t| t.is_file())
                    .unwrap_or(false)
                {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!(error = %err, "Failed to read directory entry"),
        }
    }
    Ok(files)
}

struct BarHandler {
    bar: ProgressBar,
}

impl ProgressHandler for BarHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { .. } => {}
            ProgressEvent::FileCompleted { path, .. } => {
                self.bar.set_message(path.clone());
                self.bar.inc(1);
            }
            ProgressEvent::BatchCompleted { .. } => self.bar.finish(),
        }
    }
}
