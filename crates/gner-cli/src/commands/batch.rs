//! Batch command - process a whole dataset directory.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use gner_core::{Evaluation, NerPipeline, ProcessOptions};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Dataset root directory (default: from config)
    data_dir: Option<PathBuf>,

    /// Score every sample against its ground-truth file
    #[arg(long)]
    eval: bool,

    /// Write decoded predictions to the result directory
    #[arg(long)]
    write: bool,

    /// Result directory (default: from config)
    #[arg(long)]
    result_dir: Option<PathBuf>,

    /// Path to the compiled ONNX model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the label vocabulary file
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Stop after this many samples (0 = no limit)
    #[arg(long, default_value = "0")]
    limit: usize,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(labels) = args.labels {
        config.label_path = labels;
    }
    if let Some(result_dir) = args.result_dir {
        config.result_dir = result_dir;
    }

    // Samples are whatever has an adjacency payload on disk.
    let pattern = config
        .data_dir
        .join("adjacency")
        .join("*.bin")
        .display()
        .to_string();
    let mut samples: Vec<String> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    samples.sort();

    if args.limit > 0 {
        samples.truncate(args.limit);
    }

    if samples.is_empty() {
        anyhow::bail!("No samples found under {}", pattern);
    }

    println!(
        "{} Found {} samples to process",
        style("ℹ").blue(),
        samples.len()
    );

    let pipeline = NerPipeline::from_config(&config)?;

    if args.write {
        fs::create_dir_all(&config.result_dir)?;
    }

    let opts = ProcessOptions {
        eval: args.eval,
        write: args.write,
        result_dir: Some(config.result_dir.clone()),
    };

    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} samples")
            .unwrap()
            .progress_chars("=>-"),
    );

    // A failed sample aborts only itself; the run keeps going.
    let mut eval = Evaluation::new();
    let mut failures = 0usize;
    for sample in &samples {
        if let Err(e) = pipeline.process(&config.data_dir, sample, &opts, &mut eval) {
            warn!("Failed to process '{}': {}", sample, e);
            failures += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let processed = samples.len() - failures;
    println!(
        "{} Processed {}/{} samples in {:.2}s",
        style("✓").green(),
        processed,
        samples.len(),
        start.elapsed().as_secs_f64()
    );
    if failures > 0 {
        println!("{} {} samples failed", style("⚠").yellow(), failures);
    }

    if args.eval {
        println!();
        println!("{}", eval);
    } else if let Some(mean) = eval.mean_inference() {
        println!("mean inference: {:.2} ms", mean.as_secs_f64() * 1000.0);
    }

    if processed == 0 {
        anyhow::bail!("Every sample failed");
    }

    Ok(())
}
