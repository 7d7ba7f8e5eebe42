use std::sync::Arc;

use super::*;

struct RejectQuestions;

impl ClaimClassifier for RejectQuestions {
    fn is_claim(&self, sentence: &str) -> Result<bool, ClaimError> {
        Ok(!sentence.starts_with("Quid"))
    }
}

struct AlwaysFails;

impl ClaimClassifier for AlwaysFails {
    fn is_claim(&self, _sentence: &str) -> Result<bool, ClaimError> {
        Err(ClaimError::ClassifierFailed {
            reason: "offline".to_string(),
        })
    }
}

#[test]
fn test_split_latin_fixture() {
    let claims = SentenceClaimExtractor::new()
        .extract("t1", "Gratia non tollit naturam, sed perficit. Homo est animal rationale.\n")
        .expect("extract");
    let texts: Vec<&str> = claims.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Gratia non tollit naturam, sed perficit", "Homo est animal rationale"]
    );
    assert_eq!(claims[1].index, 1);
    assert_eq!(claims[1].turn_id, "t1");
}

#[test]
fn test_split_mixed_punctuation_and_blanks() {
    assert_eq!(
        split_sentences("Ita!  Quare?? ... Sic est"),
        vec!["Ita", "Quare", "Sic est"]
    );
    assert!(split_sentences("  . ! ?  ").is_empty());
    assert!(split_sentences("").is_empty());
}

#[test]
fn test_classifier_filters_and_reindexes() {
    let extractor = SentenceClaimExtractor::new().with_classifier(Arc::new(RejectQuestions));
    let claims = extractor
        .extract("t2", "Quid est homo? Homo est animal rationale. Deus est.")
        .expect("extract");
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].index, 0);
    assert_eq!(claims[0].text, "Homo est animal rationale");
}

#[test]
fn test_classifier_failure_keeps_sentences() {
    let extractor = SentenceClaimExtractor::new().with_classifier(Arc::new(AlwaysFails));
    let claims = extractor.extract("t3", "Una. Duae.").expect("extract");
    assert_eq!(claims.len(), 2);
}

#[test]
fn test_claim_serializes_with_audit_field_names() {
    let json = serde_json::to_value(Claim::new("t1", 0, "Homo est animal rationale")).expect("json");
    assert_eq!(json["turn_id"], "t1");
    assert_eq!(json["claim_id"], 0);
    assert_eq!(json["claim_text"], "Homo est animal rationale");
}
