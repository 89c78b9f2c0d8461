//! Loading tensor payloads from dataset files.
//!
//! Samples live under a dataset root with one subdirectory per input
//! slot: `adjacency/<sample>.bin` (slot 0) and `feature/<sample>.bin`
//! (slot 1), plus `label/<sample>.bin` ground-truth class ids for
//! evaluation runs. Payloads are little-endian, exactly sized by the
//! graph dimensions.

use std::path::{Path, PathBuf};

use tracing::debug;

use gner_inference::InputTensor;

use crate::config::GraphDims;
use crate::error::{LabelError, NerError, Result, TensorError};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for i32 {}
}

/// Element types tensor files can hold.
pub trait TensorElement: sealed::Sealed + Copy {
    /// Element width in bytes.
    const WIDTH: usize;

    /// Decode one element from little-endian bytes.
    fn from_le(bytes: &[u8]) -> Self;
}

impl TensorElement for f32 {
    const WIDTH: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl TensorElement for i32 {
    const WIDTH: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Model input slots, in the order the model consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    /// Slot 0: `nodes x nodes` graph connectivity.
    Adjacency,
    /// Slot 1: `nodes x features` per-node attributes.
    Feature,
}

impl InputSlot {
    /// Slot position in the model's input list.
    pub fn index(&self) -> usize {
        match self {
            InputSlot::Adjacency => 0,
            InputSlot::Feature => 1,
        }
    }

    /// Dataset subdirectory holding this slot's payloads.
    pub fn dir(&self) -> &'static str {
        match self {
            InputSlot::Adjacency => "adjacency",
            InputSlot::Feature => "feature",
        }
    }

    /// Expected tensor shape for this slot.
    pub fn shape(&self, dims: &GraphDims) -> [usize; 2] {
        match self {
            InputSlot::Adjacency => dims.adjacency_shape(),
            InputSlot::Feature => dims.feature_shape(),
        }
    }

    /// Expected element count for this slot.
    pub fn element_count(&self, dims: &GraphDims) -> usize {
        let [rows, cols] = self.shape(dims);
        rows * cols
    }

    /// On-disk path of a sample's payload for this slot.
    pub fn path(&self, data_dir: &Path, sample: &str) -> PathBuf {
        data_dir.join(self.dir()).join(format!("{}.bin", sample))
    }
}

/// Read exactly `expected` elements of `T` from a little-endian file.
///
/// A file holding any other number of elements is a size mismatch; on
/// failure nothing is returned, so callers never observe a partially
/// filled buffer.
pub fn read_tensor_from_file<T: TensorElement>(
    path: &Path,
    expected: usize,
) -> Result<Vec<T>, TensorError> {
    let bytes = std::fs::read(path).map_err(|source| TensorError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() != expected * T::WIDTH {
        return Err(TensorError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual: bytes.len() / T::WIDTH,
        });
    }

    let data = bytes.chunks_exact(T::WIDTH).map(T::from_le).collect();
    debug!("Read {} elements from {}", expected, path.display());
    Ok(data)
}

/// Load one input slot of a sample and shape it for the model.
///
/// Adjacency and feature payloads load independently; the pipeline
/// combines them into the ordered input list only at the inference
/// boundary.
pub fn read_input_tensor(
    data_dir: &Path,
    sample: &str,
    slot: InputSlot,
    dims: &GraphDims,
) -> Result<InputTensor> {
    let path = slot.path(data_dir, sample);
    let data = read_tensor_from_file::<f32>(&path, slot.element_count(dims))?;
    let tensor = InputTensor::from_f32(data, slot.shape(dims).to_vec())?;
    Ok(tensor)
}

/// Load a sample's ground-truth class ids, one per node.
///
/// Ids are range-checked against the vocabulary size; a stale label file
/// from a different class count fails here instead of skewing the scores.
pub fn read_label_file(path: &Path, dims: &GraphDims) -> Result<Vec<u32>> {
    let raw = read_tensor_from_file::<i32>(path, dims.nodes)?;

    let mut ids = Vec::with_capacity(raw.len());
    for (node, &id) in raw.iter().enumerate() {
        if id < 0 || id as usize >= dims.classes {
            return Err(NerError::Label(LabelError::OutOfRange {
                id,
                node,
                classes: dims.classes,
            }));
        }
        ids.push(id as u32);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dims() -> GraphDims {
        GraphDims {
            nodes: 3,
            features: 2,
            classes: 3,
        }
    }

    fn write_f32(path: &Path, values: &[f32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(path, bytes).unwrap();
    }

    fn write_i32(path: &Path, values: &[i32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn reads_exactly_sized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        write_f32(&path, &[1.0, 2.0, 3.0, 4.0]);

        let data = read_tensor_from_file::<f32>(&path, 4).unwrap();
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn short_payload_is_a_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        write_f32(&path, &[1.0, 2.0]);

        let err = read_tensor_from_file::<f32>(&path, 4).unwrap_err();
        assert!(matches!(
            err,
            TensorError::SizeMismatch {
                expected: 4,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn long_payload_is_a_size_mismatch_too() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        write_f32(&path, &[0.0; 6]);

        let err = read_tensor_from_file::<f32>(&path, 4).unwrap_err();
        assert!(matches!(err, TensorError::SizeMismatch { actual: 6, .. }));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_tensor_from_file::<f32>(Path::new("/nonexistent/t.bin"), 4).unwrap_err();
        assert!(matches!(err, TensorError::Open { .. }));
    }

    #[test]
    fn input_slot_resolves_path_and_shape() {
        let dims = dims();
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("feature")).unwrap();

        let path = InputSlot::Feature.path(dir.path(), "sample_0");
        write_f32(&path, &[0.5; 6]);

        let tensor = read_input_tensor(dir.path(), "sample_0", InputSlot::Feature, &dims).unwrap();
        assert_eq!(tensor.shape(), &[3, 2]);

        assert_eq!(InputSlot::Adjacency.index(), 0);
        assert_eq!(InputSlot::Feature.index(), 1);
        assert_eq!(InputSlot::Adjacency.element_count(&dims), 9);
    }

    #[test]
    fn label_ids_are_range_checked() {
        let dims = dims();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.bin");

        write_i32(&path, &[0, 1, 2]);
        assert_eq!(read_label_file(&path, &dims).unwrap(), vec![0, 1, 2]);

        write_i32(&path, &[0, 3, 2]);
        let err = read_label_file(&path, &dims).unwrap_err();
        assert!(matches!(
            err,
            NerError::Label(LabelError::OutOfRange { id: 3, node: 1, .. })
        ));
    }
}
