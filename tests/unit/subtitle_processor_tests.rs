/*!
 * Tests for subtitle parsing and right-to-left rendering
 */

use anyhow::Result;
use std::path::Path;

use rtlsub::subtitle_processor::{SubtitleCollection, SubtitleFormat, VTT_RTL_HEADER};
use rtlsub::translation::formatting::wrap_rtl;

use crate::common;

#[test]
fn test_format_from_path_withMixedCase_shouldDetect() {
    assert_eq!(SubtitleFormat::from_path("a/Lesson.VTT"), Some(SubtitleFormat::Vtt));
    assert_eq!(SubtitleFormat::from_path("intro.Srt"), Some(SubtitleFormat::Srt));
    assert_eq!(SubtitleFormat::from_path("notes.txt"), None);
    assert_eq!(SubtitleFormat::from_path("no_extension"), None);
}

#[test]
fn test_parse_withSampleLessons_shouldKeepCueOrder() -> Result<()> {
    let vtt = SubtitleCollection::parse("lesson1.vtt", common::ENGLISH_VTT)?;
    assert_eq!(vtt.entries.len(), 3);
    assert_eq!(vtt.entries[0].start_time_ms, 1_000);
    assert_eq!(vtt.entries[2].text, "Please open your editor before we begin");

    let srt = SubtitleCollection::parse("intro.srt", common::ENGLISH_SRT)?;
    assert_eq!(srt.format, SubtitleFormat::Srt);
    assert_eq!(srt.texts()[1], "We will build a small web server together");
    Ok(())
}

#[test]
fn test_parse_withByteOrderMarkAndEmptyCue_shouldKeepEmptyCue() -> Result<()> {
    let content = "\u{FEFF}WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n\n00:00:03.000 --> 00:00:04.000\nSecond\n";
    let collection = SubtitleCollection::parse("a.vtt", content)?;

    assert_eq!(collection.entries.len(), 2);
    assert_eq!(collection.entries[0].text, "");
    assert_eq!(collection.entries[1].text, "Second");
    Ok(())
}

#[test]
fn test_parse_withoutHeader_shouldFailForVtt() {
    let content = "00:00:01.000 --> 00:00:02.000\nHello\n";
    assert!(SubtitleCollection::parse(Path::new("a.vtt"), content).is_err());
}

#[test]
fn test_text_batches_withRemainder_shouldCoverEveryCue() -> Result<()> {
    let collection = SubtitleCollection::parse("lesson1.vtt", common::ENGLISH_VTT)?;

    let batches = collection.text_batches(2);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[1].len(), 1);
    assert_eq!(batches.concat(), collection.texts());
    Ok(())
}

#[test]
fn test_render_vtt_withTranslations_shouldBeRightToLeft() -> Result<()> {
    let collection = SubtitleCollection::parse("lesson1.vtt", common::ENGLISH_VTT)?;
    let translations: Vec<String> = ["واحد", "اثنان", "ثلاثة"].iter().map(|t| wrap_rtl(t)).collect();

    let rendered = collection.with_translations(translations)?.render();

    assert!(rendered.starts_with(VTT_RTL_HEADER));
    assert!(rendered.contains("00:00:05.000 --> 00:00:09.000 align:right\n\u{202B}اثنان\u{202C}\n"));
    assert_eq!(rendered.matches("align:right").count(), 3);

    // The output parses again with the same timings
    let reparsed = SubtitleCollection::parse("lesson1.vtt", &rendered)?;
    assert_eq!(reparsed.entries.len(), 3);
    assert_eq!(reparsed.entries[2].end_time_ms, 14_000);
    Ok(())
}

#[test]
fn test_render_srt_withTranslations_shouldRenumberAndKeepTimings() -> Result<()> {
    let content = "7\n00:00:01,000 --> 00:00:02,000\nOne\n\n9\n00:00:03,000 --> 00:00:04,000\nTwo\n";
    let collection = SubtitleCollection::parse("intro.srt", content)?;

    let rendered = collection
        .with_translations(vec!["واحد".to_string(), "اثنان".to_string()])?
        .render();

    assert_eq!(
        rendered,
        "1\n00:00:01,000 --> 00:00:02,000\nواحد\n\n2\n00:00:03,000 --> 00:00:04,000\nاثنان\n\n"
    );
    Ok(())
}

#[test]
fn test_with_translations_withWrongCount_shouldFail() -> Result<()> {
    let collection = SubtitleCollection::parse("intro.srt", common::ENGLISH_SRT)?;
    assert!(collection.with_translations(vec!["one".to_string()]).is_err());
    Ok(())
}
