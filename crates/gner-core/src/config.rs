//! Configuration structures for the NER inference pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Static graph dimensions fixing every tensor shape in the pipeline.
///
/// Adjacency is `nodes x nodes`, the feature tensor `nodes x features`,
/// and the output logits `nodes x classes`. Any payload of a different
/// size is rejected at the loader or post-processor boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphDims {
    /// Number of graph nodes.
    pub nodes: usize,

    /// Per-node feature vector length.
    pub features: usize,

    /// Number of label classes.
    pub classes: usize,
}

impl Default for GraphDims {
    fn default() -> Self {
        // Dimensions of the published GCN export this pipeline ships with.
        Self {
            nodes: 2708,
            features: 1433,
            classes: 7,
        }
    }
}

impl GraphDims {
    /// Shape of the adjacency input tensor.
    pub fn adjacency_shape(&self) -> [usize; 2] {
        [self.nodes, self.nodes]
    }

    /// Shape of the feature input tensor.
    pub fn feature_shape(&self) -> [usize; 2] {
        [self.nodes, self.features]
    }

    /// Shape of the output logits tensor.
    pub fn logits_shape(&self) -> [usize; 2] {
        [self.nodes, self.classes]
    }
}

/// Main configuration for the gner pipeline.
///
/// Immutable after construction; consumed once at pipeline init.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GnerConfig {
    /// Device the pipeline instance is bound to. Concurrent instances
    /// must use distinct ids; the runtime session is created per instance.
    pub device_id: u32,

    /// Path to the compiled ONNX model.
    pub model_path: PathBuf,

    /// Path to the label vocabulary file (one label per line).
    pub label_path: PathBuf,

    /// Dataset root holding `adjacency/`, `feature/` and `label/`
    /// sample subdirectories.
    pub data_dir: PathBuf,

    /// Directory decoded results are written to.
    pub result_dir: PathBuf,

    /// Intra-op thread count for the inference session.
    pub intra_threads: usize,

    /// Graph dimensions.
    pub dims: GraphDims,
}

impl Default for GnerConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            model_path: PathBuf::from("model/gcn_ner.onnx"),
            label_path: PathBuf::from("data/labels.txt"),
            data_dir: PathBuf::from("data"),
            result_dir: PathBuf::from("results"),
            intra_threads: 4,
            dims: GraphDims::default(),
        }
    }
}

impl GnerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dims_fix_tensor_shapes() {
        let dims = GraphDims {
            nodes: 5,
            features: 3,
            classes: 3,
        };
        assert_eq!(dims.adjacency_shape(), [5, 5]);
        assert_eq!(dims.feature_shape(), [5, 3]);
        assert_eq!(dims.logits_shape(), [5, 3]);
    }

    #[test]
    fn config_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = GnerConfig::default();
        config.device_id = 2;
        config.dims.nodes = 5;
        config.save(&path).unwrap();

        let loaded = GnerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.device_id, 2);
        assert_eq!(loaded.dims.nodes, 5);
        assert_eq!(loaded.model_path, config.model_path);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: GnerConfig = serde_json::from_str(r#"{"device_id": 1}"#).unwrap();
        assert_eq!(config.device_id, 1);
        assert_eq!(config.dims, GraphDims::default());
    }
}
