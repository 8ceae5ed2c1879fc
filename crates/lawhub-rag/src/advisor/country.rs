//! Country detection from question text

/// `(keyword, country)` pairs in detection order. The first keyword found
/// anywhere in the lowercased question wins.
pub const COUNTRY_KEYWORDS: &[(&str, &str)] = &[
    ("india", "India"),
    ("pakistan", "Pakistan"),
    ("usa", "USA"),
    ("australia", "Australia"),
    ("canada", "Canada"),
    ("uk", "UK"),
    ("bhutan", "Bhutan"),
    ("nepal", "Nepal"),
    ("new zealand", "New Zealand"),
    ("singapore", "Singapore"),
];

/// Detect a country mentioned in the question.
///
/// Keywords match as substrings, so `"usa"` also matches inside longer
/// words.
pub fn detect_country(question: &str) -> Option<&'static str> {
    let lower = question.to_lowercase();
    COUNTRY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, country)| *country)
}

/// Recognized country names in detection order
pub fn supported_countries() -> Vec<String> {
    COUNTRY_KEYWORDS
        .iter()
        .map(|(_, country)| country.to_string())
        .collect()
}
