//! Inline query answers

mod helpers;

use bismillah_bot::inline::{ayah_results, default_results, InlineResponder};
use bismillah_bot::telegram::MAX_MESSAGE_LENGTH;
use helpers::synthetic_quran;

#[test]
fn test_reference_yields_translation_and_tafsir() {
    let quran = synthetic_quran();

    let results = ayah_results(&quran, "2:255").unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "2:255english");
    assert_eq!(results[0].title, "English");
    assert_eq!(results[0].input_message_content.message_text, "english 2:255 (2:255)");
    assert_eq!(results[1].id, "2:255tafsir");
    assert_eq!(results[1].title, "Tafsir");
    assert_eq!(results[1].input_message_content.message_text, "tafsir 2:255 (2:255)");
}

#[test]
fn test_free_text_yields_defaults() {
    let quran = synthetic_quran();
    let responder = InlineResponder::new(&quran);

    let results = responder.answer(&quran, "not a verse");

    assert_eq!(results.len(), 15);
    assert_eq!(results, default_results(&quran));
    assert_eq!(results[0].id, "13:28def");
    assert_eq!(results[0].title, "13:28");
    assert!(results.iter().any(|r| r.id == "2:255def"));
}

#[test]
fn test_nonexistent_reference_yields_defaults() {
    let quran = synthetic_quran();
    let responder = InlineResponder::new(&quran);

    assert!(ayah_results(&quran, "115:1").is_none());
    assert_eq!(responder.answer(&quran, "2:287").len(), 15);
    assert_eq!(responder.answer(&quran, "").len(), 15);
}

#[test]
fn test_result_ids_are_unique() {
    let quran = synthetic_quran();
    let results = default_results(&quran);

    let mut ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), results.len());
}

#[test]
fn test_description_is_shortened() {
    let mut translation = helpers::synthetic_surahs("english");
    translation[1][254] = "word ".repeat(100);
    let quran = helpers::quran_from(translation, helpers::synthetic_surahs("tafsir"));

    let results = ayah_results(&quran, "2:255").unwrap();

    assert_eq!(results[0].description.chars().count(), 120);
    assert!(results[0].input_message_content.message_text.ends_with("(2:255)"));
}

#[test]
fn test_long_tafsir_fits_one_message() {
    let mut tafsir = helpers::synthetic_surahs("tafsir");
    tafsir[1][281] = "x".repeat(6000);
    let quran = helpers::quran_from(helpers::synthetic_surahs("english"), tafsir);

    let results = ayah_results(&quran, "2:282").unwrap();

    let text = &results[1].input_message_content.message_text;
    assert_eq!(text.chars().count(), MAX_MESSAGE_LENGTH);
    assert!(text.chars().all(|c| c == 'x'));
    assert_eq!(results[0].input_message_content.message_text, "english 2:282 (2:282)");
}
