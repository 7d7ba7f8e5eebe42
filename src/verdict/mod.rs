//! Verdict Aggregator: NLI scores over retrieved evidence to one verdict per claim.
//!
//! Each evidence chunk is classified as premise against the claim as
//! hypothesis. The aggregate is the label-wise running maximum over all
//! evidence, so evidence order never changes the outcome. The decision rule
//! is applied to that maximum:
//!
//! 1. `entailment > contradiction && entailment > neutral` → [`Verdict::Supported`]
//! 2. `contradiction > entailment`, or `contradiction == entailment > neutral`
//!    → [`Verdict::Refuted`]
//! 3. otherwise → [`Verdict::Uncertain`]
//!
//! Without an entailment backend every claim is `uncertain`.

mod aggregator;
mod types;


pub use aggregator::VerdictAggregator;
pub use types::{EvidenceAssessment, Verdict, VerdictRecord};
