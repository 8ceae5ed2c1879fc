//! Detection of model output that echoes the prompt template

/// Markers that only appear in output when the model repeated its prompt
const TEMPLATE_MARKERS: &[&str] = &["1. Immediate Actions Required", "Answer:"];

/// True when generated text contains a prompt template marker.
///
/// Legitimate answers that happen to contain `"Answer:"` are rejected too;
/// they are routed to the rule-based advisor.
pub fn is_degenerate(text: &str) -> bool {
    TEMPLATE_MARKERS.iter().any(|marker| text.contains(marker))
}
