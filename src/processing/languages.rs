//! Spoken language detection

/// Common languages and the spellings a CV may use for them.
const LANGUAGE_VARIANTS: &[(&str, &[&str])] = &[
    ("english", &["english", "fluent english", "native english"]),
    ("spanish", &["spanish", "español", "castellano"]),
    ("french", &["french", "français"]),
    ("german", &["german", "deutsch"]),
    ("chinese", &["chinese", "mandarin", "中文"]),
    ("arabic", &["arabic", "عربي"]),
    ("hindi", &["hindi", "हिंदी"]),
    ("portuguese", &["portuguese", "português"]),
    ("italian", &["italian", "italiano"]),
    ("japanese", &["japanese", "日本語"]),
];

/// Required languages mentioned in `text`, in the order they were asked for.
pub fn extract_languages(text: &str, required: &[String]) -> Vec<String> {
    let text_lower = text.to_lowercase();

    required
        .iter()
        .filter(|language| mentions_language(&text_lower, language))
        .cloned()
        .collect()
}

fn mentions_language(text_lower: &str, language: &str) -> bool {
    let language = language.trim().to_lowercase();
    if language.is_empty() {
        return false;
    }

    match LANGUAGE_VARIANTS.iter().find(|(name, _)| *name == language) {
        Some((_, variants)) => variants.iter().any(|variant| text_lower.contains(variant)),
        None => text_lower.contains(&language),
    }
}
