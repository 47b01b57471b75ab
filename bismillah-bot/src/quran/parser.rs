//! Corpus source file parsers
//!
//! Each parser returns the raw surah/ayah table. Count validation happens
//! when the table is turned into a [`Corpus`](super::Corpus).

use crate::error::{BotError, BotResult};

/// Salawat ligature (ﷺ followed by a left-to-right mark)
pub const SALAWAT: &str = "\u{FDFA}\u{200E}";

const TRANSLATION_SALAWAT: &str = "– peace and blessings be upon him";
const TAFSIR_SALAWAT: &str = "(s)";

/// Lines that introduce a surah in the Jalalayn text and close the current verse
const JALALAYN_PREAMBLES: [&str; 5] = [
    "Medinese",
    "Meccan",
    "[Consists",
    "Mecca, consisting",
    "This was revealed",
];

/// Parse a tanzil.net text file with `surah|ayah|text` lines
///
/// Blank lines are skipped and the first line starting with `#` ends the
/// data (tanzil appends its license as a comment block).
pub fn parse_tanzil(content: &str) -> BotResult<Vec<Vec<String>>> {
    let mut surahs: Vec<Vec<String>> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('#') {
            break;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 3 {
            return Err(BotError::Corpus(format!(
                "line {}: expected 3 fields, found {}",
                line_no,
                fields.len()
            )));
        }

        let surah = parse_number(fields[0], line_no)?;
        let ayah = parse_number(fields[1], line_no)?;
        let text = fields[2].trim().replace(TRANSLATION_SALAWAT, SALAWAT);

        if surah == surahs.len() + 1 {
            surahs.push(Vec::new());
        } else if surah != surahs.len() {
            return Err(BotError::Corpus(format!(
                "line {}: surah {} out of order",
                line_no, surah
            )));
        }

        let current = surahs
            .last_mut()
            .ok_or_else(|| BotError::Corpus(format!("line {}: no surah", line_no)))?;
        if ayah != current.len() + 1 {
            return Err(BotError::Corpus(format!(
                "line {}: ayah {}:{} out of order",
                line_no, surah, ayah
            )));
        }
        current.push(text);
    }

    Ok(surahs)
}

fn parse_number(field: &str, line_no: usize) -> BotResult<usize> {
    field
        .trim()
        .parse()
        .map_err(|_| BotError::Corpus(format!("line {}: invalid number {:?}", line_no, field)))
}

/// Parse Tafsir al-Jalalayn as produced by `pdftotext -nopgbrk Al_Jalalain_Eng.pdf`
///
/// Verses are introduced by `[s:a]` marker lines and run until the next
/// marker or a surah preamble. Lines starting with a digit are page numbers.
pub fn parse_jalalayn(content: &str) -> Vec<Vec<String>> {
    let mut surahs = Vec::new();
    let mut surah: Vec<String> = Vec::new();
    let mut verse: Vec<String> = Vec::new();
    let (mut s, mut v) = (1u32, 1u32);
    let mut in_verse = false;

    for line in content.lines() {
        if line.is_empty() || line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        if line.starts_with(&format!("[{}:{}]", s, v)) {
            in_verse = true;
        } else if line.starts_with(&format!("[{}:{}]", s, v + 1)) {
            surah.push(verse.join(" "));
            verse.clear();
            v += 1;
            in_verse = true;
        } else if line.starts_with(&format!("[{}:1]", s + 1)) {
            surah.push(verse.join(" "));
            verse.clear();
            surahs.push(std::mem::take(&mut surah));
            s += 1;
            v = 1;
            in_verse = true;
        } else if JALALAYN_PREAMBLES.iter().any(|p| line.starts_with(p)) {
            // 26:200 contains the only verse line that starts with "Meccan"
            if s == 26 && v == 200 {
                verse.push(tafsir_line(line));
            } else {
                in_verse = false;
            }
        } else if in_verse {
            verse.push(tafsir_line(line));
        }
    }

    surah.push(verse.join(" "));
    surahs.push(surah);
    surahs
}

fn tafsir_line(line: &str) -> String {
    line.trim().replace(TAFSIR_SALAWAT, SALAWAT)
}
