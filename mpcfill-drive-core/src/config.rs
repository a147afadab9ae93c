use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::manifest::{DEFAULT_CARDBACK, DEFAULT_STOCK};

/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where bare output file names are written and bare input names are looked up.
    pub output_dir: PathBuf,
    pub fetch: FetchConfig,
    pub manifest: ManifestDefaults,
    pub traversal: TraversalDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            fetch: FetchConfig::default(),
            manifest: ManifestDefaults::default(),
            traversal: TraversalDefaults::default(),
        }
    }
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            timeout_secs = self.fetch.timeout_secs,
            max_depth = self.traversal.max_depth,
            stock = %self.manifest.stock,
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestDefaults {
    pub stock: String,
    pub foil: bool,
    /// Drive id of the image used for every slot without its own back.
    pub cardback: String,
}

impl Default for ManifestDefaults {
    fn default() -> Self {
        Self {
            stock: DEFAULT_STOCK.to_string(),
            foil: false,
            cardback: DEFAULT_CARDBACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalDefaults {
    /// Used when `--recursive` is given without `--max-depth`.
    pub max_depth: u32,
}

impl Default for TraversalDefaults {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}
