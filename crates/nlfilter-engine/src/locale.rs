//! Script/keyword locale detection
//!
//! Best-effort classification of raw query text into a small closed set of
//! locales. The model itself handles semantic multilingual understanding;
//! this heuristic only picks the locale hint interpolated into the prompt
//! and the locale component of the cache key, so it needs no accuracy
//! guarantee beyond a sensible default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing locale for prompt hints and cache-key partitioning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
    Es,
}

impl Locale {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
            Locale::Es => "es",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Locale> {
        match tag.trim().to_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ar" => Some(Locale::Ar),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Spanish function words that rarely appear in English or transliterated
/// queries. Matched on whole lowercase words.
const SPANISH_KEYWORDS: &[&str] = &[
    "con", "donde", "dónde", "entre", "mayor", "menor", "nombre", "usuarios", "creado",
    "creada", "despues", "después", "antes", "contiene", "igual", "fecha",
];

/// Classify query text by script and a small keyword list.
///
/// Returns `None` when nothing matches; callers fall back to their
/// configured default locale.
pub fn detect(text: &str) -> Option<Locale> {
    if text.chars().any(is_arabic) {
        return Some(Locale::Ar);
    }
    if looks_spanish(text) {
        return Some(Locale::Es);
    }
    None
}

fn is_arabic(c: char) -> bool {
    // Arabic, Arabic Supplement, Arabic Extended-A
    matches!(c,
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

fn looks_spanish(text: &str) -> bool {
    if text.chars().any(|c| matches!(c, 'ñ' | 'Ñ' | '¿' | '¡')) {
        return true;
    }
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| SPANISH_KEYWORDS.contains(&word))
}
