//! The Qur'an corpus: verse coordinates, navigation, parsed texts and
//! surah metadata
//!
//! All texts are loaded once at startup and are read-only afterwards.

pub mod metadata;
pub mod navigation;
pub mod parser;

pub use metadata::{make_index, parse_surah_names};
pub use navigation::{exists, surah_length, VerseRef, SURAH_COUNT, SURAH_LENGTHS, TOTAL_AYAHS};

use crate::error::{BotError, BotResult};
use bismillah_common::config::{resolve_relative, CorpusConfig, TafsirFormat};
use std::path::Path;
use tracing::info;

/// One text variant of the Qur'an, indexed by [`VerseRef`]
#[derive(Debug, Clone)]
pub struct Corpus {
    surahs: Vec<Vec<String>>,
}

impl Corpus {
    /// Validate a parsed surah/ayah table against the fixed ayah counts
    pub fn from_surahs(surahs: Vec<Vec<String>>) -> BotResult<Self> {
        if surahs.len() != SURAH_COUNT as usize {
            return Err(BotError::Corpus(format!(
                "expected {} surahs, found {}",
                SURAH_COUNT,
                surahs.len()
            )));
        }

        for (i, (ayahs, &expected)) in surahs.iter().zip(SURAH_LENGTHS.iter()).enumerate() {
            if ayahs.len() != usize::from(expected) {
                return Err(BotError::Corpus(format!(
                    "surah {} has {} ayahs, expected {}",
                    i + 1,
                    ayahs.len(),
                    expected
                )));
            }
        }

        let total: usize = surahs.iter().map(Vec::len).sum();
        if total != TOTAL_AYAHS {
            return Err(BotError::Corpus(format!("Missing verses! found {}", total)));
        }

        Ok(Self { surahs })
    }

    /// Ayah text followed by its reference, e.g. `... (2:255)`
    pub fn get_ayah(&self, verse: VerseRef) -> String {
        format!("{} ({})", self.raw(verse), verse)
    }

    /// Ayah text without the reference suffix
    pub fn raw(&self, verse: VerseRef) -> &str {
        // VerseRef is validated on construction and the table on load
        &self.surahs[usize::from(verse.surah) - 1][usize::from(verse.ayah) - 1]
    }

    pub fn get_surah(&self, surah: u16) -> Option<&[String]> {
        if surah == 0 {
            return None;
        }
        self.surahs.get(usize::from(surah) - 1).map(Vec::as_slice)
    }
}

/// Everything the bot reads from the corpus files
#[derive(Debug, Clone)]
pub struct Quran {
    pub translation: Corpus,
    pub tafsir: Corpus,
    pub surah_names: Vec<String>,
}

impl Quran {
    /// Load and validate the translation, commentary and metadata files
    pub fn load(data_folder: &Path, config: &CorpusConfig) -> BotResult<Self> {
        let translation_path = resolve_relative(data_folder, &config.translation_file);
        let translation = Corpus::from_surahs(parser::parse_tanzil(&read(&translation_path)?)?)
            .map_err(|e| context(&translation_path, e))?;
        info!("Loaded translation from {}", translation_path.display());

        let tafsir_path = resolve_relative(data_folder, &config.tafsir_file);
        let tafsir_text = read(&tafsir_path)?;
        let tafsir_surahs = match config.tafsir_format {
            TafsirFormat::Jalalayn => parser::parse_jalalayn(&tafsir_text),
            TafsirFormat::Tanzil => parser::parse_tanzil(&tafsir_text)?,
        };
        let tafsir = Corpus::from_surahs(tafsir_surahs).map_err(|e| context(&tafsir_path, e))?;
        info!("Loaded tafsir from {}", tafsir_path.display());

        let metadata_path = resolve_relative(data_folder, &config.metadata_file);
        let surah_names =
            parse_surah_names(&read(&metadata_path)?).map_err(|e| context(&metadata_path, e))?;

        Ok(Self {
            translation,
            tafsir,
            surah_names,
        })
    }

    /// HTML index of all surahs for the /index command
    pub fn index(&self) -> String {
        make_index(&self.surah_names)
    }
}

fn read(path: &Path) -> BotResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BotError::Corpus(format!("cannot read {}: {}", path.display(), e)))
}

fn context(path: &Path, err: BotError) -> BotError {
    match err {
        BotError::Corpus(msg) => BotError::Corpus(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}
