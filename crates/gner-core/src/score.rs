//! Span-level evaluation against ground truth.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::GraphDims;
use crate::error::Result;
use crate::labels::LabelMap;
use crate::postprocess::{decode_spans, SpanMap};
use crate::tensor_io::read_label_file;

/// Accumulated counters and timing for one evaluation run.
///
/// One session per run: create it fresh before the first sample, feed it
/// every sample, read the totals after the last. Two runs never share
/// state, so repeated or parallel evaluations cannot bleed into each
/// other.
#[derive(Debug, Default)]
pub struct Evaluation {
    true_pos: u64,
    false_pos: u64,
    false_neg: u64,
    samples: u64,
    infer_cost: Vec<Duration>,
}

impl Evaluation {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one sample's predicted spans against ground truth.
    ///
    /// A span counts as matched only when its entity type and both
    /// bounds agree exactly.
    pub fn score_sample(&mut self, predicted: &SpanMap, truth: &SpanMap) {
        for (ty, pred_spans) in predicted {
            let truth_spans = truth.get(ty);
            for span in pred_spans {
                if truth_spans.is_some_and(|set| set.contains(span)) {
                    self.true_pos += 1;
                } else {
                    self.false_pos += 1;
                }
            }
        }

        for (ty, truth_spans) in truth {
            let pred_spans = predicted.get(ty);
            for span in truth_spans {
                if !pred_spans.is_some_and(|set| set.contains(span)) {
                    self.false_neg += 1;
                }
            }
        }

        self.samples += 1;
        debug!(
            "Scored sample: running tp={} fp={} fn={}",
            self.true_pos, self.false_pos, self.false_neg
        );
    }

    /// Score a decoded prediction against the ground-truth label file.
    ///
    /// The reference sequence decodes through the same span extraction
    /// as the prediction, then the two span sets intersect per entity
    /// type.
    pub fn count_predict_result(
        &mut self,
        label_file: &Path,
        argmax: &[u32],
        labels: &LabelMap,
        dims: &GraphDims,
    ) -> Result<()> {
        let truth_ids = read_label_file(label_file, dims)?;
        let truth = decode_spans(&truth_ids, labels);
        let predicted = decode_spans(argmax, labels);
        self.score_sample(&predicted, &truth);
        Ok(())
    }

    /// Log one sample's inference latency.
    pub fn record_inference(&mut self, cost: Duration) {
        self.infer_cost.push(cost);
    }

    pub fn true_positives(&self) -> u64 {
        self.true_pos
    }

    pub fn false_positives(&self) -> u64 {
        self.false_pos
    }

    pub fn false_negatives(&self) -> u64 {
        self.false_neg
    }

    /// Number of samples scored so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Precision over all scored samples; 0.0 with no predictions.
    pub fn precision(&self) -> f64 {
        let denom = self.true_pos + self.false_pos;
        if denom == 0 {
            0.0
        } else {
            self.true_pos as f64 / denom as f64
        }
    }

    /// Recall over all scored samples; 0.0 with no ground-truth spans.
    pub fn recall(&self) -> f64 {
        let denom = self.true_pos + self.false_neg;
        if denom == 0 {
            0.0
        } else {
            self.true_pos as f64 / denom as f64
        }
    }

    /// Harmonic mean of precision and recall; 0.0 when both are zero.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Total inference time across recorded samples.
    pub fn total_inference(&self) -> Duration {
        self.infer_cost.iter().sum()
    }

    /// Mean inference time, if anything was recorded.
    pub fn mean_inference(&self) -> Option<Duration> {
        if self.infer_cost.is_empty() {
            None
        } else {
            Some(self.total_inference() / self.infer_cost.len() as u32)
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "samples: {}  tp: {}  fp: {}  fn: {}",
            self.samples, self.true_pos, self.false_pos, self.false_neg
        )?;
        write!(
            f,
            "precision: {:.4}  recall: {:.4}  f1: {:.4}",
            self.precision(),
            self.recall(),
            self.f1()
        )?;
        if let Some(mean) = self.mean_inference() {
            write!(f, "\nmean inference: {:.2} ms", mean.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}
