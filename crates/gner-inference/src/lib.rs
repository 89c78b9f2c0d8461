//! ONNX inference abstraction layer for gner.
//!
//! This crate provides a unified interface for running the compiled
//! graph-convolution NER model across different backends:
//! - `ort` with XNNPACK execution provider for native platforms
//! - `tract` directly for WASM/browser environments
//!
//! The backend owns the loaded model and the runtime resources behind it;
//! dropping the backend releases both. A failed load acquires nothing.

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor, TensorType};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

#[cfg(feature = "wasm")]
pub use backend::tract::TractBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
