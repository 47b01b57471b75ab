//! Inline query answers (`@BismillahBot 2:255` in any chat)
//!
//! Inline queries are stateless: nothing is read from or written to the
//! session store.

use crate::dispatcher::parse_ayah;
use crate::quran::{Quran, VerseRef};
use crate::telegram::{fit_message, InlineQueryResult};

/// How long clients may cache an inline answer (seconds)
pub const INLINE_CACHE_TIME: u32 = 7 * 24 * 60 * 60;

/// Characters of ayah text shown in a result's description
const DESCRIPTION_CHARS: usize = 120;

/// Shown when the query is not an ayah reference
const DEFAULT_AYAHS: [(u16, u16); 15] = [
    (13, 28),
    (33, 56),
    (2, 62),
    (10, 31),
    (17, 36),
    (5, 32),
    (39, 9),
    (17, 44),
    (7, 57),
    (3, 7),
    (2, 255),
    (57, 20),
    (49, 12),
    (16, 125),
    (24, 35),
];

fn description(text: &str) -> String {
    text.chars().take(DESCRIPTION_CHARS).collect()
}

fn article(id: String, title: String, text: &str) -> InlineQueryResult {
    InlineQueryResult::article(id, title, description(text), fit_message(text).to_string())
}

/// The fixed result list for queries that are not an ayah reference
pub fn default_results(quran: &Quran) -> Vec<InlineQueryResult> {
    DEFAULT_AYAHS
        .iter()
        .filter_map(|&(s, a)| VerseRef::new(s.into(), a.into()))
        .map(|verse| {
            article(
                format!("{}def", verse),
                verse.to_string(),
                &quran.translation.get_ayah(verse),
            )
        })
        .collect()
}

/// Translation and tafsir results for `query`, or `None` if the query does
/// not name an existing ayah
pub fn ayah_results(quran: &Quran, query: &str) -> Option<Vec<InlineQueryResult>> {
    let (surah, ayah) = parse_ayah(&query.to_lowercase())?;
    let verse = VerseRef::new(surah, ayah)?;

    Some(vec![
        article(
            format!("{}english", verse),
            "English".to_string(),
            &quran.translation.get_ayah(verse),
        ),
        article(
            format!("{}tafsir", verse),
            "Tafsir".to_string(),
            &quran.tafsir.get_ayah(verse),
        ),
    ])
}

/// Inline answers with the default list precomputed at startup
pub struct InlineResponder {
    defaults: Vec<InlineQueryResult>,
}

impl InlineResponder {
    pub fn new(quran: &Quran) -> Self {
        Self {
            defaults: default_results(quran),
        }
    }

    pub fn answer(&self, quran: &Quran, query: &str) -> Vec<InlineQueryResult> {
        ayah_results(quran, query).unwrap_or_else(|| self.defaults.clone())
    }
}
