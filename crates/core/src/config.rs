// Aggregation run configuration
//
// AggregateConfig can be:
// - Created with defaults (./results, csv, "summary", both datasets)
// - Adjusted with the builder-style `with_*` methods (the CLI maps flags onto these)

use crate::export::{output_path, DataKind, DataSelection, ExportFormat};
use crate::prompt::PromptClassifier;
use std::path::PathBuf;

pub const DEFAULT_RESULTS_DIR: &str = "./results";
pub const DEFAULT_OUTPUT_PREFIX: &str = "summary";

/// Configuration for one aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateConfig {
    /// Root of the config/timestamp/model hierarchy
    pub results_dir: PathBuf,

    /// Export file format
    pub format: ExportFormat,

    /// Output path prefix; `_raw`/`_stats` and the extension are appended
    pub output_prefix: String,

    /// Datasets to export
    pub data: DataSelection,

    /// Prompt classification used when normalizing records
    pub classifier: PromptClassifier,
}

impl AggregateConfig {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    pub fn with_data(mut self, data: DataSelection) -> Self {
        self.data = data;
        self
    }

    pub fn with_classifier(mut self, classifier: PromptClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Destination file for one dataset
    pub fn output_path(&self, kind: DataKind) -> PathBuf {
        output_path(&self.output_prefix, kind, self.format)
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            format: ExportFormat::default(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            data: DataSelection::default(),
            classifier: PromptClassifier::default(),
        }
    }
}
