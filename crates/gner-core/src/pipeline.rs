//! End-to-end pipeline: load inputs, run the model, decode, score.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use gner_inference::{InferenceBackend, InputTensor, OutputTensor};

use crate::config::{GnerConfig, GraphDims};
use crate::error::{NerError, Result};
use crate::labels::LabelMap;
use crate::postprocess::{argmax, decode_spans, SpanMap};
use crate::score::Evaluation;
use crate::tensor_io::{read_input_tensor, InputSlot};
use crate::writer::write_result;

/// Per-sample processing switches.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Score the prediction against the sample's ground-truth file.
    pub eval: bool,

    /// Write the decoded prediction to `result_dir`.
    pub write: bool,

    /// Where result files go when `write` is set.
    pub result_dir: Option<PathBuf>,
}

/// One pipeline instance: the loaded model plus the label vocabulary
/// and the graph dimensions every tensor is validated against.
///
/// The instance exclusively owns its backend (and through it the model
/// and runtime resources); dropping the pipeline releases everything
/// exactly once. Processing is sequential per instance; concurrent
/// pipelines need their own instances on distinct devices.
pub struct NerPipeline<B: InferenceBackend> {
    backend: B,
    labels: LabelMap,
    dims: GraphDims,
}

impl<B: InferenceBackend> std::fmt::Debug for NerPipeline<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NerPipeline")
            .field("labels", &self.labels)
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

impl<B: InferenceBackend> NerPipeline<B> {
    /// Assemble a pipeline from an already-loaded backend and vocabulary.
    ///
    /// Fails if the vocabulary length disagrees with the class count or
    /// the model does not declare the two graph inputs.
    pub fn with_backend(backend: B, labels: LabelMap, dims: GraphDims) -> Result<Self> {
        if labels.len() != dims.classes {
            return Err(NerError::Config(format!(
                "vocabulary holds {} labels but the graph declares {} classes",
                labels.len(),
                dims.classes
            )));
        }

        let declared = backend.input_names().len();
        if declared != 2 {
            return Err(NerError::Config(format!(
                "model declares {} inputs, expected adjacency and feature",
                declared
            )));
        }

        Ok(Self {
            backend,
            labels,
            dims,
        })
    }

    /// The loaded label vocabulary.
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// The graph dimensions this instance validates against.
    pub fn dims(&self) -> &GraphDims {
        &self.dims
    }

    /// Run a forward pass over an ordered input list.
    ///
    /// Inputs must be exactly `[adjacency, feature]`; each tensor's shape
    /// is checked against its slot before anything reaches the device.
    /// Blocks until the pass completes or the backend reports a fault.
    pub fn infer(&self, inputs: Vec<InputTensor>) -> Result<Vec<OutputTensor>> {
        if inputs.len() != 2 {
            return Err(NerError::InputCount {
                expected: 2,
                actual: inputs.len(),
            });
        }

        for (slot, tensor) in [InputSlot::Adjacency, InputSlot::Feature].iter().zip(&inputs) {
            let expected = slot.shape(&self.dims);
            if tensor.shape() != expected {
                return Err(NerError::Shape {
                    expected: expected.to_vec(),
                    actual: tensor.shape().to_vec(),
                });
            }
        }

        let names = self.backend.input_names();
        let named: Vec<(&str, InputTensor)> = names
            .iter()
            .map(String::as_str)
            .zip(inputs)
            .collect();

        let outputs = self.backend.run(&named)?;
        Ok(outputs.into_iter().map(|(_, tensor)| tensor).collect())
    }

    /// Drive one sample end to end.
    ///
    /// Loads both input tensors, runs timed inference, arg-max decodes
    /// the logits, then optionally writes the result and scores it
    /// against `label/<sample>.bin`. The first failing stage aborts the
    /// sample and propagates; the caller decides whether the run
    /// continues with the next sample.
    pub fn process(
        &self,
        data_dir: &Path,
        sample: &str,
        opts: &ProcessOptions,
        eval: &mut Evaluation,
    ) -> Result<Vec<u32>> {
        debug!("Processing sample '{}'", sample);

        let adjacency = read_input_tensor(data_dir, sample, InputSlot::Adjacency, &self.dims)?;
        let feature = read_input_tensor(data_dir, sample, InputSlot::Feature, &self.dims)?;

        let start = Instant::now();
        let outputs = self.infer(vec![adjacency, feature])?;
        let cost = start.elapsed();
        eval.record_inference(cost);

        let logits = outputs
            .into_iter()
            .next()
            .ok_or_else(|| NerError::Output("model produced no outputs".to_string()))?;

        let prediction = argmax(&logits, &self.dims)?;

        if opts.write {
            let dir = opts
                .result_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("results"));
            write_result(&dir.join(format!("{}.txt", sample)), &prediction, &self.labels)?;
        }

        if opts.eval {
            let label_file = data_dir.join("label").join(format!("{}.bin", sample));
            eval.count_predict_result(&label_file, &prediction, &self.labels, &self.dims)?;
        }

        info!(
            "Sample '{}' done in {:.2} ms",
            sample,
            cost.as_secs_f64() * 1000.0
        );
        Ok(prediction)
    }

    /// Decode a prediction into entity spans with this instance's
    /// vocabulary.
    pub fn spans(&self, prediction: &[u32]) -> SpanMap {
        decode_spans(prediction, &self.labels)
    }
}

#[cfg(feature = "native")]
impl NerPipeline<gner_inference::OrtBackend> {
    /// Initialize a native pipeline from configuration.
    ///
    /// Staged: the runtime session (device context + model) comes up
    /// first, then the label vocabulary loads. Each stage fails with its
    /// own error and a failed stage drops whatever the earlier stages
    /// acquired, so nothing leaks out of a failed init.
    pub fn from_config(config: &GnerConfig) -> Result<Self> {
        info!(
            "Initializing pipeline on device {} from {}",
            config.device_id,
            config.model_path.display()
        );

        let backend = gner_inference::OrtBackend::from_file_with_threads(
            &config.model_path,
            config.intra_threads,
        )?;
        let labels = LabelMap::from_file(&config.label_path, config.dims.classes)?;

        info!(
            "Model loaded: inputs {:?}, outputs {:?}, {} labels",
            backend.input_names(),
            backend.output_names(),
            labels.len()
        );

        Self::with_backend(backend, labels, config.dims)
    }
}
