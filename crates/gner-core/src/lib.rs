//! Core library for graph-convolution NER inference.
//!
//! This crate provides:
//! - Tensor file loading sized by static graph dimensions
//! - Label vocabulary handling with BIO tag parsing
//! - Arg-max decoding and entity-span extraction
//! - Span-level evaluation (precision/recall/F1) with per-run sessions
//! - The end-to-end per-sample pipeline

pub mod config;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod postprocess;
pub mod score;
pub mod tensor_io;
pub mod writer;

pub use config::{GnerConfig, GraphDims};
pub use error::{LabelError, NerError, Result, TensorError};
pub use labels::{LabelMap, Tag, OUTSIDE_LABEL};
pub use pipeline::{NerPipeline, ProcessOptions};
pub use postprocess::{argmax, decode_spans, SpanMap, TagSpan};
pub use score::Evaluation;
pub use tensor_io::{read_input_tensor, read_label_file, read_tensor_from_file, InputSlot};
pub use writer::write_result;

/// Re-export inference types.
pub use gner_inference::{InferenceBackend, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use gner_inference::OrtBackend;

#[cfg(feature = "wasm")]
pub use gner_inference::TractBackend;
