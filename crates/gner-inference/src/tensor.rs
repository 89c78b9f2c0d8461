//! Tensor types for inference input/output.

use ndarray::{ArrayD, IxDyn};

use crate::error::InferenceError;
use crate::Result;

/// Supported tensor data types.
///
/// The NER graph model moves f32 payloads (adjacency, features, logits);
/// i32 covers label-index payloads and i64 the index-typed outputs some
/// exports emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Int32,
    Int64,
}

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

impl InputTensor {
    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Int32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
        }
    }

    /// Get the data type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            InputTensor::Float32(_) => TensorType::Float32,
            InputTensor::Int32(_) => TensorType::Int32,
            InputTensor::Int64(_) => TensorType::Int64,
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// True when the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a Float32 tensor from raw data and shape.
    ///
    /// Fails when the data length does not match the shape's element count.
    pub fn from_f32(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(InputTensor::Float32(arr))
    }

    /// Create an Int32 tensor from raw data and shape.
    pub fn from_i32(data: Vec<i32>, shape: Vec<usize>) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(InputTensor::Int32(arr))
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    /// Get the data type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            OutputTensor::Float32(_) => TensorType::Float32,
            OutputTensor::Int32(_) => TensorType::Int32,
            OutputTensor::Int64(_) => TensorType::Int64,
        }
    }

    /// Try to get the inner Float32 array.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            OutputTensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner Int64 array.
    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            OutputTensor::Int64(arr) => Some(arr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_f32_shapes_the_data() {
        let t = InputTensor::from_f32(vec![0.0; 6], vec![2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.dtype(), TensorType::Float32);
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn from_f32_rejects_length_mismatch() {
        let err = InputTensor::from_f32(vec![0.0; 5], vec![2, 3]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInput(_)));
    }

    #[test]
    fn from_i32_shapes_the_data() {
        let t = InputTensor::from_i32(vec![1, 2, 3], vec![3]).unwrap();
        assert_eq!(t.shape(), &[3]);
        assert_eq!(t.dtype(), TensorType::Int32);
    }

    #[test]
    fn output_accessors_match_variant() {
        let arr = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0f32; 4]).unwrap();
        let out = OutputTensor::Float32(arr);
        assert!(out.as_f32().is_some());
        assert!(out.as_i64().is_none());
    }
}
