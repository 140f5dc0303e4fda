//! Fixed-width vector payloads.
//!
//! `sqlite-vec` stores vectors as plain blobs: `float[N]` is `N` contiguous
//! `f32` values, `int8[N]` is `N` signed bytes and `bit[N]` is `N / 8` bytes with
//! eight dimensions per byte. Encoding and decoding here are byte-for-byte; no
//! endianness conversion is applied, the native byte order is what the
//! extension itself reads.

use serde::{Deserialize, Serialize};
use zerocopy::IntoBytes;

use crate::error::{Result, SqlVecError};

/// A vector value bound as a blob parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Vector {
    Float32(Vec<f32>),
    Int8(Vec<i8>),
    Bit(BitVector),
}

impl Vector {
    #[must_use]
    pub fn float32(values: impl Into<Vec<f32>>) -> Self {
        Vector::Float32(values.into())
    }

    #[must_use]
    pub fn int8(values: impl Into<Vec<i8>>) -> Self {
        Vector::Int8(values.into())
    }

    #[must_use]
    pub fn bits(values: impl Into<Vec<bool>>) -> Self {
        Vector::Bit(BitVector::new(values.into()))
    }

    /// Number of logical dimensions.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match self {
            Vector::Float32(values) => values.len(),
            Vector::Int8(values) => values.len(),
            Vector::Bit(bits) => bits.len(),
        }
    }

    /// Blob layout expected by the extension.
    #[must_use]
    pub fn to_blob(&self) -> Vec<u8> {
        match self {
            Vector::Float32(values) => values.as_slice().as_bytes().to_vec(),
            Vector::Int8(values) => values.as_slice().as_bytes().to_vec(),
            Vector::Bit(bits) => bits.to_bytes(),
        }
    }
}

/// Reinterpret a blob as `f32` elements.
///
/// # Errors
/// Returns [`SqlVecError::InvalidVector`] if the blob length is not a multiple of four.
pub fn decode_f32(blob: &[u8]) -> Result<Vec<f32>> {
    let width = size_of::<f32>();
    if blob.len() % width != 0 {
        return Err(SqlVecError::InvalidVector(format!(
            "{} bytes is not a whole number of float32 elements",
            blob.len()
        )));
    }
    let mut values = vec![0f32; blob.len() / width];
    values.as_mut_bytes().copy_from_slice(blob);
    Ok(values)
}

/// Reinterpret a blob as `i8` elements.
#[must_use]
pub fn decode_i8(blob: &[u8]) -> Vec<i8> {
    let mut values = vec![0i8; blob.len()];
    values.as_mut_bytes().copy_from_slice(blob);
    values
}

/// Packed boolean vector, least significant bit first within each byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitVector {
    bits: Vec<bool>,
}

impl BitVector {
    #[must_use]
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Unpack `dimensions` bits from a blob. Padding bits past `dimensions` are dropped.
    ///
    /// # Errors
    /// Returns [`SqlVecError::InvalidVector`] if the blob holds fewer than `dimensions` bits.
    pub fn from_bytes(blob: &[u8], dimensions: usize) -> Result<Self> {
        if dimensions > blob.len() * 8 {
            return Err(SqlVecError::InvalidVector(format!(
                "{} bytes cannot hold {dimensions} bits",
                blob.len()
            )));
        }
        let bits = (0..dimensions)
            .map(|idx| blob[idx / 8] & (1 << (idx % 8)) != 0)
            .collect();
        Ok(Self { bits })
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.bits.len().div_ceil(8)];
        for (idx, bit) in self.bits.iter().enumerate() {
            if *bit {
                bytes[idx / 8] |= 1 << (idx % 8);
            }
        }
        bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<bool> {
        self.bits
    }
}

impl From<Vec<bool>> for BitVector {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}
