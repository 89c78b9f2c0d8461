//! Error types for the gner-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the gner library.
#[derive(Error, Debug)]
pub enum NerError {
    /// Tensor file loading error.
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),

    /// Label vocabulary or ground-truth error.
    #[error("label error: {0}")]
    Label(#[from] LabelError),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] gner_inference::InferenceError),

    /// Tensor shape disagrees with the graph dimensions.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Wrong number of input tensors for the model.
    #[error("expected {expected} input tensors, got {actual}")]
    InputCount { expected: usize, actual: usize },

    /// Model output missing or of an unexpected type.
    #[error("unexpected model output: {0}")]
    Output(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading tensor payloads from files.
#[derive(Error, Debug)]
pub enum TensorError {
    /// The tensor file could not be opened or read.
    #[error("failed to read tensor file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file holds a different number of elements than the graph
    /// dimensions require.
    #[error("tensor file {path} holds {actual} elements, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// Errors related to the label vocabulary and ground-truth files.
#[derive(Error, Debug)]
pub enum LabelError {
    /// The label file could not be opened or read.
    #[error("failed to read label file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The vocabulary length disagrees with the configured class count.
    #[error("label file holds {actual} labels, expected {expected}")]
    CountMismatch { expected: usize, actual: usize },

    /// A vocabulary entry is empty.
    #[error("label file has an empty entry at line {line}")]
    Empty { line: usize },

    /// A ground-truth class id falls outside the vocabulary.
    #[error("class id {id} at node {node} is outside the {classes}-class vocabulary")]
    OutOfRange {
        id: i32,
        node: usize,
        classes: usize,
    },
}

/// Result type for the gner library.
pub type Result<T, E = NerError> = std::result::Result<T, E>;
