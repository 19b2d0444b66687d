//! The `curate rank` command: order items for labeling and report accuracy.

mod setup;
pub mod types;

pub use types::{OutputFormat, PresortArg, ReportFormat, StrategyArg, TieBreakArg};

use clap::Args;
use curate_core::report::{metrics_json, metrics_text};
use curate_core::{
    ActiveLearningRun, AggregateReport, Config, OrderWriter, OutputFormat as CoreOutputFormat,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub use setup::expand_path;
use setup::{apply_overrides, setup_run};

/// Arguments for the `rank` command.
#[derive(Args, Debug)]
pub struct RankArgs {
    /// Predictions file (JSON Lines: {"item", "scores", optional "label"})
    #[arg(required = true)]
    pub predictions: PathBuf,

    /// Labeled directory tree (<dir>/<label>/<items>) used as ground truth
    #[arg(long)]
    pub labels_dir: Option<PathBuf>,

    /// Labels file; score entries for other labels are ignored
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Prioritization strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Ordering inside each stratum (stratified strategies only)
    #[arg(long, value_enum)]
    pub presort: Option<PresortArg>,

    /// Tie-break rule for equal confidences
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,

    /// Process only this fraction of items, in (0, 1]
    #[arg(long)]
    pub sample_fraction: Option<f64>,

    /// Seed for sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Candidate labels kept per item
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Accept items of any file type
    #[arg(long)]
    pub all_formats: bool,

    /// Output file for the ordered items (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format for the ordered items
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write the metrics report to this file (defaults to stderr)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Metrics report format
    #[arg(long, value_enum, default_value = "text")]
    pub report_format: ReportFormat,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Manual Default impl for constructing RankArgs outside of clap.
///
/// Values match the clap annotations above.
impl Default for RankArgs {
    fn default() -> Self {
        Self {
            predictions: PathBuf::new(),
            labels_dir: None,
            labels: None,
            strategy: None,
            presort: None,
            tie_break: None,
            sample_fraction: None,
            seed: None,
            top_k: None,
            all_formats: false,
            output: None,
            format: None,
            pretty: false,
            report: None,
            report_format: ReportFormat::Text,
            no_progress: false,
        }
    }
}

/// Execute the rank command.
pub fn execute(args: RankArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let ctx = setup_run(config, &args)?;

    // Without ground truth there is nothing to report on an empty corpus
    if ctx.items.is_empty() && ctx.ground_truth().is_none() {
        tracing::warn!("No items to rank in {:?}", args.predictions);
        return Ok(());
    }
    tracing::info!(
        "Ranking {} item(s) with {}",
        ctx.items.len(),
        ctx.config.prioritization.strategy
    );

    let mut run = ActiveLearningRun::new(&ctx.config, &ctx.predictions, ctx.ground_truth())?;

    let progress = if args.no_progress {
        indicatif::ProgressBar::hidden()
    } else {
        create_progress_bar(ctx.items.len() as u64)
    };
    for item in &ctx.items {
        run.step(item);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let outcome = run.finish()?;
    let stats = &outcome.stats;
    tracing::info!(
        "{} scored, {} evaluated, {} skipped ({} sampled out, {} not applicable, {} not found, {} rejected)",
        stats.scored,
        stats.evaluated,
        stats.skipped(),
        stats.sampled_out,
        stats.not_applicable,
        stats.not_found,
        stats.rejected
    );

    let format =
        CoreOutputFormat::parse(&ctx.config.output.format).unwrap_or(CoreOutputFormat::Text);
    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer =
                OrderWriter::new(BufWriter::new(file), format, ctx.config.output.pretty);
            writer.write_order(&outcome.records)?;
            writer.flush()?;
            tracing::info!("Wrote {} item(s) to {:?}", writer.items_written(), path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OrderWriter::new(stdout.lock(), format, ctx.config.output.pretty);
            writer.write_order(&outcome.records)?;
            writer.flush()?;
        }
    }

    if let Some(metrics) = &outcome.metrics {
        write_metrics(
            metrics,
            args.report.as_deref(),
            args.report_format,
            ctx.config.output.pretty,
        )?;
    }

    Ok(())
}

fn write_metrics(
    metrics: &AggregateReport,
    path: Option<&Path>,
    format: ReportFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    let rendered = match format {
        ReportFormat::Text => metrics_text(metrics),
        ReportFormat::Json => format!("{}\n", metrics_json(metrics, pretty)?),
    };
    match path {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!("Metrics report written to {:?}", path);
        }
        None => {
            std::io::stderr().write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}
