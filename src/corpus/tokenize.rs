/// Lowercased word tokens of `text`.
///
/// Any non-alphanumeric character separates tokens; empty tokens are dropped.
/// The same function feeds the lexical index, query scoring and the gate's
/// novelty and toxicity metrics, so all of them agree on what a word is.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}
