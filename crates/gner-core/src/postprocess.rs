//! Decoding model output into per-node labels and entity spans.

use std::collections::{BTreeMap, BTreeSet};

use gner_inference::OutputTensor;

use crate::config::GraphDims;
use crate::error::{NerError, Result};
use crate::labels::{LabelMap, Tag};

/// A contiguous run of nodes carrying one entity type. Bounds are
/// inclusive node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagSpan {
    pub start: u32,
    pub end: u32,
}

impl TagSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Entity type to its disjoint spans. One type may span several
/// separate node runs.
pub type SpanMap = BTreeMap<String, BTreeSet<TagSpan>>;

/// Select the highest-scoring class per node from the output logits.
///
/// The logits must be a `Float32` tensor shaped `nodes x classes`; a
/// model retrained with a different class count fails here rather than
/// decoding into garbage. Ties go to the lowest class index. Pure
/// function: same logits, same result.
pub fn argmax(logits: &OutputTensor, dims: &GraphDims) -> Result<Vec<u32>> {
    let arr = logits
        .as_f32()
        .ok_or_else(|| NerError::Output(format!("logits are {:?}, expected Float32", logits.dtype())))?;

    let expected = dims.logits_shape();
    if arr.shape() != expected {
        return Err(NerError::Shape {
            expected: expected.to_vec(),
            actual: arr.shape().to_vec(),
        });
    }

    let mut result = Vec::with_capacity(dims.nodes);
    for node in 0..dims.nodes {
        let mut max_idx = 0u32;
        let mut max_val = f32::NEG_INFINITY;

        for class in 0..dims.classes {
            let val = arr[[node, class]];
            if val > max_val {
                max_val = val;
                max_idx = class as u32;
            }
        }

        result.push(max_idx);
    }

    Ok(result)
}

fn close_span(spans: &mut SpanMap, ty: &str, start: usize, end: usize) {
    spans
        .entry(ty.to_string())
        .or_default()
        .insert(TagSpan::new(start as u32, end as u32));
}

/// Extract entity spans from a decoded label sequence.
///
/// Single ordered walk over the nodes. `B-` always opens a span, closing
/// any open one; `I-` of the same type extends the open span, while an
/// orphan continuation opens a new span of its type; the outside label
/// closes. A span still open at the last node closes there.
pub fn decode_spans(argmax: &[u32], labels: &LabelMap) -> SpanMap {
    let mut spans = SpanMap::new();
    let mut open: Option<(&str, usize)> = None;

    for (node, &class_id) in argmax.iter().enumerate() {
        match labels.tag(class_id) {
            Tag::Outside => {
                if let Some((ty, start)) = open.take() {
                    close_span(&mut spans, ty, start, node - 1);
                }
            }
            Tag::Begin(ty) => {
                if let Some((prev, start)) = open.take() {
                    close_span(&mut spans, prev, start, node - 1);
                }
                open = Some((ty, node));
            }
            Tag::Inside(ty) => {
                let continues = matches!(open, Some((prev, _)) if prev == ty);
                if !continues {
                    if let Some((prev, start)) = open.take() {
                        close_span(&mut spans, prev, start, node - 1);
                    }
                    open = Some((ty, node));
                }
            }
        }
    }

    if let Some((ty, start)) = open {
        close_span(&mut spans, ty, start, argmax.len() - 1);
    }

    spans
}

#[cfg(test)]
mod tests {
    use ndarray::ArrayD;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dims(nodes: usize, classes: usize) -> GraphDims {
        GraphDims {
            nodes,
            features: 1,
            classes,
        }
    }

    fn logits(nodes: usize, classes: usize, values: Vec<f32>) -> OutputTensor {
        let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&[nodes, classes]), values).unwrap();
        OutputTensor::Float32(arr)
    }

    fn bio_labels() -> LabelMap {
        LabelMap::from_labels(vec![
            "O".into(),
            "B-name".into(),
            "I-name".into(),
            "B-org".into(),
            "I-org".into(),
        ])
    }

    #[test]
    fn argmax_picks_unique_maximum() {
        let out = logits(2, 3, vec![0.1, 0.9, 0.2, 0.7, 0.1, 0.3]);
        assert_eq!(argmax(&out, &dims(2, 3)).unwrap(), vec![1, 0]);
    }

    #[test]
    fn argmax_ties_go_to_lowest_index() {
        let out = logits(1, 3, vec![0.5, 0.5, 0.5]);
        assert_eq!(argmax(&out, &dims(1, 3)).unwrap(), vec![0]);
    }

    #[test]
    fn argmax_is_deterministic() {
        let values = vec![0.3, 0.1, 0.6, 0.6, 0.2, 0.2];
        let out = logits(2, 3, values);
        let first = argmax(&out, &dims(2, 3)).unwrap();
        let second = argmax(&out, &dims(2, 3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn argmax_rejects_shape_drift() {
        // Logits from a 4-class model against a 3-class contract.
        let out = logits(2, 4, vec![0.0; 8]);
        let err = argmax(&out, &dims(2, 3)).unwrap_err();
        assert!(matches!(err, NerError::Shape { .. }));
    }

    #[test]
    fn argmax_rejects_wrong_dtype() {
        let arr = ArrayD::from_shape_vec(ndarray::IxDyn(&[2, 3]), vec![0i64; 6]).unwrap();
        let err = argmax(&OutputTensor::Int64(arr), &dims(2, 3)).unwrap_err();
        assert!(matches!(err, NerError::Output(_)));
    }

    #[test]
    fn all_outside_decodes_to_no_spans() {
        let spans = decode_spans(&[0, 0, 0, 0], &bio_labels());
        assert!(spans.is_empty());
    }

    #[test]
    fn one_contiguous_run_is_one_span() {
        // O B-name I-name I-name O
        let spans = decode_spans(&[0, 1, 2, 2, 0], &bio_labels());

        assert_eq!(spans.len(), 1);
        let name_spans = &spans["name"];
        assert_eq!(name_spans.len(), 1);
        assert!(name_spans.contains(&TagSpan::new(1, 3)));
    }

    #[test]
    fn span_open_at_the_last_node_closes_there() {
        // O O B-name I-name
        let spans = decode_spans(&[0, 0, 1, 2], &bio_labels());
        assert!(spans["name"].contains(&TagSpan::new(2, 3)));
    }

    #[test]
    fn begin_closes_the_previous_span() {
        // B-name I-name B-name I-name
        let spans = decode_spans(&[1, 2, 1, 2], &bio_labels());

        let name_spans = &spans["name"];
        assert_eq!(name_spans.len(), 2);
        assert!(name_spans.contains(&TagSpan::new(0, 1)));
        assert!(name_spans.contains(&TagSpan::new(2, 3)));
    }

    #[test]
    fn orphan_continuation_opens_its_own_span() {
        // O I-org I-org O
        let spans = decode_spans(&[0, 4, 4, 0], &bio_labels());
        assert!(spans["org"].contains(&TagSpan::new(1, 2)));
    }

    #[test]
    fn type_change_inside_continuation_splits_spans() {
        // B-name I-org -> two spans of different types
        let spans = decode_spans(&[1, 4], &bio_labels());

        assert!(spans["name"].contains(&TagSpan::new(0, 0)));
        assert!(spans["org"].contains(&TagSpan::new(1, 1)));
    }

    #[test]
    fn known_spans_round_trip_through_decode() {
        let labels = bio_labels();
        let known: Vec<(&str, u32, u32)> = vec![("name", 1, 3), ("org", 5, 6), ("name", 8, 8)];

        // Encode the spans back into a label sequence.
        let mut sequence = vec![0u32; 10];
        for &(ty, start, end) in &known {
            let (begin, inside) = match ty {
                "name" => (1, 2),
                _ => (3, 4),
            };
            sequence[start as usize] = begin;
            for node in (start + 1)..=end {
                sequence[node as usize] = inside;
            }
        }

        let decoded = decode_spans(&sequence, &labels);

        let mut expected = SpanMap::new();
        for (ty, start, end) in known {
            expected
                .entry(ty.to_string())
                .or_default()
                .insert(TagSpan::new(start, end));
        }
        assert_eq!(decoded, expected);
    }
}
