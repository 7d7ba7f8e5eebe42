use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;
use turngate::MockEntailmentScorer;
use turngate::claims::Claim;
use turngate::corpus::Chunk;
use turngate::embedding::{EntailmentScorer, NliScores};
use turngate::retrieval::{EvidenceResult, FusionPolicy, fuse, rrf_contribution};
use turngate::verdict::{Verdict, VerdictAggregator};

/// Distinct positions in a random best-first order, paired with descending scores.
fn ranked_list(max_len: usize) -> impl Strategy<Value = Vec<(usize, f32)>> {
    prop::collection::btree_set(0usize..40, 0..max_len)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|positions| {
            positions
                .into_iter()
                .enumerate()
                .map(|(i, p)| (p, 1.0 - i as f32 * 0.01))
                .collect()
        })
}

fn nli() -> impl Strategy<Value = NliScores> {
    (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(e, c, n)| NliScores::new(e, c, n))
}

fn evidence(position: usize) -> EvidenceResult {
    EvidenceResult {
        position,
        chunk: Arc::new(Chunk::new("corpus", position as u32, format!("chunk {position}"))),
        fused_score: 0.0,
        lexical_score: None,
        dense_score: None,
        lexical_rank: None,
        dense_rank: None,
        rerank_score: None,
    }
}

proptest! {
    #[test]
    fn rrf_score_is_sum_of_stage_contributions(
        lexical in ranked_list(20),
        dense in ranked_list(20),
    ) {
        let fused = fuse(FusionPolicy::Rrf, &lexical, &dense);

        let mut expected: BTreeMap<usize, f64> = BTreeMap::new();
        for (i, (p, _)) in lexical.iter().enumerate() {
            *expected.entry(*p).or_default() += rrf_contribution(i + 1);
        }
        for (i, (p, _)) in dense.iter().enumerate() {
            *expected.entry(*p).or_default() += rrf_contribution(i + 1);
        }

        prop_assert_eq!(fused.len(), expected.len());
        for hit in &fused {
            let want = expected[&hit.position];
            prop_assert!((hit.score - want).abs() < 1e-12, "position {}: {} != {}", hit.position, hit.score, want);
        }
    }

    #[test]
    fn fused_output_is_sorted_and_unique(
        lexical in ranked_list(20),
        dense in ranked_list(20),
        sum in any::<bool>(),
    ) {
        let policy = if sum { FusionPolicy::NormalizedSum } else { FusionPolicy::Rrf };
        let fused = fuse(policy, &lexical, &dense);

        let positions: BTreeSet<_> = fused.iter().map(|h| h.position).collect();
        prop_assert_eq!(positions.len(), fused.len());
        for pair in fused.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].position < pair[1].position)
            );
        }
    }

    #[test]
    fn lexical_only_fusion_keeps_lexical_order(lexical in ranked_list(20)) {
        let fused = fuse(FusionPolicy::Rrf, &lexical, &[]);
        let order: Vec<_> = fused.iter().map(|h| h.position).collect();
        let want: Vec<_> = lexical.iter().map(|(p, _)| *p).collect();
        prop_assert_eq!(order, want);
    }

    #[test]
    fn verdict_ignores_evidence_order(
        scores in prop::collection::vec(nli(), 1..8),
        seed in any::<u64>(),
    ) {
        let scorer = Arc::new(MockEntailmentScorer::new());
        let items: Vec<_> = (0..scores.len()).map(evidence).collect();
        for (item, s) in items.iter().zip(&scores) {
            scorer.set(&item.chunk.text, *s);
        }
        let aggregator = VerdictAggregator::new(Some(scorer as Arc<dyn EntailmentScorer>));
        let claim = Claim::new("t", 0, "claim");

        let mut reversed = items.clone();
        reversed.reverse();
        let mut rotated = items.clone();
        rotated.rotate_left((seed as usize) % items.len());

        let forward = aggregator.verdict(&claim, &items);
        prop_assert_eq!(forward.verdict, aggregator.verdict(&claim, &reversed).verdict);
        prop_assert_eq!(forward.verdict, aggregator.verdict(&claim, &rotated).verdict);
        prop_assert_eq!(forward.scores, aggregator.verdict(&claim, &rotated).scores);
    }

    #[test]
    fn contradiction_tie_with_entailment_refutes(tie in 0.01f32..=1.0, neutral in 0.0f32..1.0) {
        prop_assume!(neutral < tie);
        prop_assert_eq!(Verdict::decide(NliScores::new(tie, tie, neutral)), Verdict::Refuted);
    }
}
