//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "wasm")]
pub mod tract;

use crate::{InputTensor, OutputTensor, Result};

/// Trait for ONNX inference backends.
///
/// This trait abstracts over different ONNX runtime implementations,
/// allowing the same pipeline code to run on native platforms (via ort)
/// and in the browser (via tract). Implementations own the loaded model
/// and any runtime resources; dropping the backend releases them.
pub trait InferenceBackend: Send + Sync {
    /// Run a forward pass with the given inputs.
    ///
    /// Blocks until the pass completes or fails; there is no retry or
    /// timeout at this layer.
    ///
    /// # Arguments
    /// * `inputs` - Named input tensors, in the model's declared order
    ///
    /// # Returns
    /// Named output tensors from the model
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Get the input names declared by the model.
    fn input_names(&self) -> &[String];

    /// Get the output names declared by the model.
    fn output_names(&self) -> &[String];
}
