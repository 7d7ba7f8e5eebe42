//! Rank fusion of the lexical and dense stages.
//!
//! Inputs are `(position, score)` lists already sorted best-first; a hit's
//! 1-based rank is its index in that list plus one.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::types::FusionPolicy;
use crate::constants::RRF_K;

/// A chunk after fusion, with the stage data that produced its score.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub position: usize,
    pub score: f64,
    pub lexical_score: Option<f32>,
    pub lexical_rank: Option<usize>,
    pub dense_score: Option<f32>,
    pub dense_rank: Option<usize>,
}

impl FusedHit {
    fn new(position: usize) -> Self {
        Self {
            position,
            score: 0.0,
            lexical_score: None,
            lexical_rank: None,
            dense_score: None,
            dense_rank: None,
        }
    }
}

/// RRF contribution of a 1-based `rank`.
#[inline]
pub fn rrf_contribution(rank: usize) -> f64 {
    1.0 / (RRF_K + rank as f64)
}

/// Fuses both stages under `policy`.
///
/// Output is sorted by fused score descending, ties by position ascending.
pub fn fuse(policy: FusionPolicy, lexical: &[(usize, f32)], dense: &[(usize, f32)]) -> Vec<FusedHit> {
    let mut hits: BTreeMap<usize, FusedHit> = BTreeMap::new();

    for (i, &(position, score)) in lexical.iter().enumerate() {
        let hit = hits.entry(position).or_insert_with(|| FusedHit::new(position));
        hit.lexical_score = Some(score);
        hit.lexical_rank = Some(i + 1);
    }
    for (i, &(position, score)) in dense.iter().enumerate() {
        let hit = hits.entry(position).or_insert_with(|| FusedHit::new(position));
        hit.dense_score = Some(score);
        hit.dense_rank = Some(i + 1);
    }

    match policy {
        FusionPolicy::Rrf => {
            for hit in hits.values_mut() {
                hit.score = hit.lexical_rank.map_or(0.0, rrf_contribution)
                    + hit.dense_rank.map_or(0.0, rrf_contribution);
            }
        }
        FusionPolicy::NormalizedSum => {
            let lex = MinMax::of(lexical);
            let den = MinMax::of(dense);
            for hit in hits.values_mut() {
                hit.score = hit.lexical_score.map_or(0.0, |s| lex.scale(s))
                    + hit.dense_score.map_or(0.0, |s| den.scale(s));
            }
        }
    }

    let mut fused: Vec<FusedHit> = hits.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.position.cmp(&b.position))
    });
    fused
}

#[derive(Debug, Clone, Copy)]
struct MinMax {
    min: f32,
    max: f32,
}

impl MinMax {
    fn of(hits: &[(usize, f32)]) -> Self {
        let (min, max) = hits
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, s)| {
                (lo.min(s), hi.max(s))
            });
        Self { min, max }
    }

    /// Maps `score` into `[0, 1]`; a degenerate range maps everything to 1.
    fn scale(&self, score: f32) -> f64 {
        let range = self.max - self.min;
        if range <= f32::EPSILON {
            1.0
        } else {
            f64::from((score - self.min) / range)
        }
    }
}
