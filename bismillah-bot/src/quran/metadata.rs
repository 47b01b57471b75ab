//! Surah metadata (`quran-data.xml` from tanzil.net) and the /index listing

use super::navigation::{SURAH_COUNT, SURAH_LENGTHS};
use crate::error::{BotError, BotResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Read transliterated surah names from tanzil's metadata XML
///
/// Every `<sura>` element must carry `index`, `ayas` and `tname`, appear in
/// order, and agree with the built-in ayah counts.
pub fn parse_surah_names(xml: &str) -> BotResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::with_capacity(SURAH_COUNT as usize);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sura" => {
                let mut index = None;
                let mut ayas = None;
                let mut tname = None;

                for attr in e.attributes() {
                    let attr = attr.map_err(|e| BotError::Corpus(format!("metadata attribute: {}", e)))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| BotError::Corpus(format!("metadata value: {}", e)))?
                        .into_owned();
                    match attr.key.as_ref() {
                        b"index" => index = value.parse::<usize>().ok(),
                        b"ayas" => ayas = value.parse::<u16>().ok(),
                        b"tname" => tname = Some(value),
                        _ => {}
                    }
                }

                let (Some(index), Some(ayas), Some(tname)) = (index, ayas, tname) else {
                    return Err(BotError::Corpus(format!(
                        "sura element {} missing index, ayas or tname",
                        names.len() + 1
                    )));
                };

                if index != names.len() + 1 {
                    return Err(BotError::Corpus(format!("sura {} out of order", index)));
                }
                if SURAH_LENGTHS.get(index - 1) != Some(&ayas) {
                    return Err(BotError::Corpus(format!(
                        "sura {} has {} ayas in metadata, expected {:?}",
                        index,
                        ayas,
                        SURAH_LENGTHS.get(index - 1)
                    )));
                }

                names.push(tname);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BotError::Corpus(format!(
                    "metadata XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if names.len() != SURAH_COUNT as usize {
        return Err(BotError::Corpus(format!(
            "metadata lists {} surahs, expected {}",
            names.len(),
            SURAH_COUNT
        )));
    }

    Ok(names)
}

/// Two-column index of all surahs, formatted as Telegram HTML
///
/// Each row links `/n` commands for surah n and n + 57. Names up to and
/// including the first right-column surah are padded to a fixed width;
/// the left ones sit inside `<code>` so the right column lines up.
pub fn make_index(names: &[String]) -> String {
    let half = names.len().div_ceil(2);
    let padded: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i > half {
                return name.clone();
            }
            let pad = " ".repeat(14usize.saturating_sub(name.chars().count()));
            let lead = if i < 9 { " " } else { "" };
            format!("{}{}{}", lead, name, pad)
        })
        .collect();

    (1..=half)
        .filter_map(|i| {
            let j = i + half;
            let right = padded.get(j - 1)?;
            Some(format!("/{} <code>{}</code>/{} {}", i, padded[i - 1], j, right))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_xml() -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<quran type=\"metadata\">\n<suras alias=\"chapters\">\n");
        for (i, len) in SURAH_LENGTHS.iter().enumerate() {
            xml.push_str(&format!(
                "<sura index=\"{}\" ayas=\"{}\" name=\"x\" tname=\"Surah-{}\" type=\"Meccan\" />\n",
                i + 1,
                len,
                i + 1
            ));
        }
        xml.push_str("</suras>\n</quran>\n");
        xml
    }

    #[test]
    fn test_parse_names() {
        let names = parse_surah_names(&metadata_xml()).unwrap();
        assert_eq!(names.len(), 114);
        assert_eq!(names[0], "Surah-1");
        assert_eq!(names[113], "Surah-114");
    }

    #[test]
    fn test_unescapes_names() {
        let xml = metadata_xml().replace("tname=\"Surah-6\"", "tname=\"Al-An&apos;aam\"");
        let names = parse_surah_names(&xml).unwrap();
        assert_eq!(names[5], "Al-An'aam");
    }

    #[test]
    fn test_wrong_length_rejected() {
        let xml = metadata_xml().replace("index=\"1\" ayas=\"7\"", "index=\"1\" ayas=\"8\"");
        assert!(parse_surah_names(&xml).is_err());
    }

    #[test]
    fn test_missing_surah_rejected() {
        let xml = metadata_xml().replace("<sura index=\"114\" ayas=\"6\" name=\"x\" tname=\"Surah-114\" type=\"Meccan\" />\n", "");
        let err = parse_surah_names(&xml).unwrap_err();
        assert!(err.to_string().contains("113 surahs"));
    }

    #[test]
    fn test_make_index_layout() {
        let names: Vec<String> = (1..=114).map(|i| format!("S{}", i)).collect();
        let index = make_index(&names);
        let rows: Vec<&str> = index.lines().collect();

        assert_eq!(rows.len(), 57);
        assert_eq!(
            rows[0],
            format!("/1 <code> S1{}</code>/58 S58{}", " ".repeat(12), " ".repeat(11))
        );
        assert_eq!(rows[1], format!("/2 <code> S2{}</code>/59 S59", " ".repeat(12)));
        assert_eq!(rows[9], format!("/10 <code>S10{}</code>/67 S67", " ".repeat(11)));
        assert_eq!(rows[56], format!("/57 <code>S57{}</code>/114 S114", " ".repeat(11)));
    }
}
