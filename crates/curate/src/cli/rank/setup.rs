//! Run setup: config overrides and source loading.

use curate_core::source::{DirectoryLabels, GroundTruth, PredictionSet};
use curate_core::{Config, SourceError};
use std::path::{Path, PathBuf};

use super::RankArgs;

/// Everything the rank command needs before processing starts.
pub struct RankContext {
    pub config: Config,
    pub predictions: PredictionSet,
    pub directory: Option<DirectoryLabels>,
    pub items: Vec<String>,
}

impl RankContext {
    /// Ground truth for this run: the label directory when given, otherwise
    /// labels embedded in the predictions file (if any).
    pub fn ground_truth(&self) -> Option<&dyn GroundTruth> {
        match &self.directory {
            Some(dir) => Some(dir),
            None if self.predictions.has_labels() => Some(&self.predictions),
            None => None,
        }
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Apply CLI flags on top of the loaded configuration.
pub fn apply_overrides(mut config: Config, args: &RankArgs) -> anyhow::Result<Config> {
    if let Some(strategy) = args.strategy {
        config.prioritization.strategy = strategy.into();
    }
    if let Some(presort) = args.presort {
        config.prioritization.presort = presort.into();
    }
    if let Some(tie_break) = args.tie_break {
        config.prioritization.tie_break = tie_break.into();
    }
    if let Some(fraction) = args.sample_fraction {
        config.sampling.fraction = Some(fraction);
    }
    if let Some(seed) = args.seed {
        config.sampling.seed = seed;
    }
    if let Some(k) = args.top_k {
        config.input.num_top_predictions = k;
    }
    if let Some(labels) = &args.labels {
        config.input.labels_file = Some(expand_path(labels).to_string_lossy().into_owned());
    }
    if let Some(format) = args.format {
        config.output.format = format.to_string();
    }
    if args.pretty {
        config.output.pretty = true;
    }
    if args.all_formats {
        config.input.supported_formats.clear();
    }

    config.validate()?;
    Ok(config)
}

/// Load predictions and ground truth, and decide the item order.
pub fn setup_run(config: Config, args: &RankArgs) -> anyhow::Result<RankContext> {
    let predictions_path = expand_path(&args.predictions);
    let predictions = match PredictionSet::load(&predictions_path, &config.input) {
        Ok(set) => set,
        Err(SourceError::MissingResource(path)) => anyhow::bail!(
            "Predictions file does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            path
        ),
        Err(e) => return Err(e.into()),
    };

    let directory = match &args.labels_dir {
        Some(dir) => Some(DirectoryLabels::scan(&expand_path(dir))?),
        None => None,
    };

    let items: Vec<String> = match &directory {
        Some(dir) => dir.items().map(String::from).collect(),
        None => predictions.items().map(String::from).collect(),
    };

    if let Some(dir) = &args.labels_dir {
        if !items.is_empty() && !items.iter().any(|item| predictions.contains(item)) {
            tracing::warn!(
                "None of the {} item(s) under {:?} appear in {:?}; item ids must match the predictions file paths",
                items.len(),
                dir,
                predictions_path
            );
        }
    }

    Ok(RankContext {
        config,
        predictions,
        directory,
        items,
    })
}
