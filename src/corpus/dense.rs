//! Normalized dense-vector index with exact inner-product search.

use half::f16;

use super::lexical::sort_desc_stable;
use crate::embedding::{inner_product, normalize};

#[derive(Debug, Clone)]
pub struct DenseIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl DenseIndex {
    /// Normalizes and stores `vectors`. Returns `None` if any vector's length
    /// differs from `dim`.
    pub fn new(dim: usize, vectors: Vec<Vec<f32>>) -> Option<Self> {
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return None;
        }
        let vectors = vectors
            .into_iter()
            .map(|mut v| {
                normalize(&mut v);
                v
            })
            .collect();
        Some(Self { dim, vectors })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.vectors.get(position).map(Vec::as_slice)
    }

    /// Top `k` positions by inner product with the (already normalized) `query`.
    ///
    /// Ties keep corpus order. A query of the wrong dimension matches nothing.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || query.len() != self.dim {
            return Vec::new();
        }
        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, inner_product(query, v)))
            .collect();
        sort_desc_stable(&mut hits);
        hits.truncate(k);
        hits
    }

    /// Row-major little-endian f16 encoding of every vector.
    pub fn to_f16_bytes(&self) -> Vec<u8> {
        self.vectors
            .iter()
            .flat_map(|v| v.iter().flat_map(|&x| f16::from_f32(x).to_le_bytes()))
            .collect()
    }

    /// Inverse of [`to_f16_bytes`](Self::to_f16_bytes).
    pub fn from_f16_bytes(dim: usize, count: usize, bytes: &[u8]) -> Option<Self> {
        if dim == 0 || bytes.len() != dim * count * 2 {
            return None;
        }
        let values: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
            .collect();
        let vectors = values.chunks_exact(dim).map(<[f32]>::to_vec).collect();
        Self::new(dim, vectors)
    }
}
