//! Run command - process a single sample end to end.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use gner_core::{Evaluation, NerPipeline, ProcessOptions};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Sample name (file stem shared by the adjacency/feature/label files)
    #[arg(required = true)]
    sample: String,

    /// Dataset root directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to the compiled ONNX model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the label vocabulary file
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Device id for this pipeline instance
    #[arg(long)]
    device: Option<u32>,

    /// Score the prediction against the sample's ground-truth file
    #[arg(long)]
    eval: bool,

    /// Write the decoded prediction to the result directory
    #[arg(long)]
    write: bool,

    /// Result directory (default: from config)
    #[arg(long)]
    result_dir: Option<PathBuf>,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
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
    if let Some(device) = args.device {
        config.device_id = device;
    }
    if let Some(result_dir) = args.result_dir {
        config.result_dir = result_dir;
    }

    info!("Processing sample: {}", args.sample);

    let pipeline = NerPipeline::from_config(&config)?;

    if args.write {
        fs::create_dir_all(&config.result_dir)?;
    }

    let opts = ProcessOptions {
        eval: args.eval,
        write: args.write,
        result_dir: Some(config.result_dir.clone()),
    };

    let mut eval = Evaluation::new();
    let prediction = pipeline.process(&config.data_dir, &args.sample, &opts, &mut eval)?;

    let spans = pipeline.spans(&prediction);
    if spans.is_empty() {
        println!("{} No entities found", style("ℹ").blue());
    } else {
        println!("{} Entities:", style("✓").green());
        for (entity, entity_spans) in &spans {
            for span in entity_spans {
                println!("  {} nodes {}..={}", style(entity).cyan(), span.start, span.end);
            }
        }
    }

    if args.eval {
        println!();
        println!("{}", eval);
    }

    println!(
        "{} Done in {:.2}s",
        style("✓").green(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
