/*!
 * Tests for file role classification, legacy migration and planning
 */

use std::path::{Path, PathBuf};

use rtlsub::app_config::NamingConfig;
use rtlsub::file_roles::{FileRole, PlannedAction, RoleClassifier, SkipReason};
use rtlsub::file_utils::{FileSystem, MemoryFileSystem};
use rtlsub::language_utils::Script;

use crate::common::{ARABIC_VTT, ENGLISH_SRT, ENGLISH_VTT};

fn classifier() -> RoleClassifier {
    RoleClassifier::new(NamingConfig::default(), Script::Arabic)
}

#[test]
fn test_naming_helpers_withEveryLegacyTag_shouldMapToCurrentNames() {
    let c = classifier();

    for legacy in ["/d/x_ar.vtt", "/d/x.ar.vtt", "/d/x-ar.vtt", "/d/x_AR.vtt"] {
        assert_eq!(c.untagged_path(Path::new(legacy)), Some(PathBuf::from("/d/x.vtt")), "{}", legacy);
    }
    assert_eq!(c.untagged_path(Path::new("/d/_ar.vtt")), None);
    assert_eq!(c.untagged_path(Path::new("/d/radar.vtt")), None);

    assert!(c.has_source_tag(Path::new("/d/Lesson_EN.srt")));
    assert_eq!(c.tagged_source_path(Path::new("/d/x.srt")), Some(PathBuf::from("/d/x_en.srt")));
    assert_eq!(c.output_path(Path::new("/d/x_en.srt")), Some(PathBuf::from("/d/x.srt")));
    assert_eq!(c.output_path(Path::new("/d/x.srt")), None);
    assert_eq!(c.output_path(Path::new("/d/x_ar_en.srt")), Some(PathBuf::from("/d/x.srt")));
}

#[test]
fn test_classify_content_withCustomNaming_shouldUseConfiguredTags() {
    let naming = NamingConfig {
        source_tag: ".orig".to_string(),
        legacy_target_tags: vec![".fa".to_string()],
    };
    let c = RoleClassifier::new(naming, Script::Arabic);

    assert_eq!(c.classify_content(Path::new("/d/a.orig.vtt"), ENGLISH_VTT), FileRole::TaggedSource);
    assert_eq!(c.classify_content(Path::new("/d/a.fa.vtt"), ARABIC_VTT), FileRole::LegacyTranslatedOutput);
    assert_eq!(c.classify_content(Path::new("/d/a_ar.vtt"), ARABIC_VTT), FileRole::TranslatedOutput);
}

#[test]
fn test_plan_withMixedFolder_shouldDecidePerFile() {
    let fs = MemoryFileSystem::new();
    // Source with a stale untranslated file in its output slot
    fs.add_file("/d/a_en.vtt", ENGLISH_VTT);
    fs.add_file("/d/a.vtt", ENGLISH_VTT);
    // Raw source
    fs.add_file("/d/b.srt", ENGLISH_SRT);
    // Finished pair
    fs.add_file("/d/c_en.vtt", ENGLISH_VTT);
    fs.add_file("/d/c.vtt", ARABIC_VTT);
    // Fresh tagged source
    fs.add_file("/d/e_en.srt", ENGLISH_SRT);
    fs.add_file("/d/readme.txt", "not a subtitle");

    let items = classifier().plan(&fs, Path::new("/d")).unwrap();
    let summary: Vec<(&Path, &PlannedAction)> =
        items.iter().map(|i| (i.path.as_path(), &i.action)).collect();

    assert_eq!(
        summary,
        vec![
            (Path::new("/d/a_en.vtt"), &PlannedAction::Translate { overwrite: true }),
            (
                Path::new("/d/b.srt"),
                &PlannedAction::RenameThenTranslate { tagged: PathBuf::from("/d/b_en.srt") }
            ),
            (Path::new("/d/c.vtt"), &PlannedAction::Skip(SkipReason::AlreadyTranslated)),
            (Path::new("/d/c_en.vtt"), &PlannedAction::Skip(SkipReason::AlreadyTranslated)),
            (Path::new("/d/e_en.srt"), &PlannedAction::Translate { overwrite: false }),
        ]
    );
    assert_eq!(items.iter().filter(|i| i.needs_translation()).count(), 3);
    assert_eq!(items[1].output_path, PathBuf::from("/d/b.srt"));
    assert_eq!(items[4].output_path, PathBuf::from("/d/e.srt"));
}

#[test]
fn test_migrate_legacy_withTranslatedTarget_shouldReportConflictAndPlanSkip() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/d/x_ar.vtt", ARABIC_VTT);
    fs.add_file("/d/x.vtt", ARABIC_VTT);
    let c = classifier();

    let report = c.migrate_legacy(&fs, Path::new("/d")).unwrap();

    assert!(report.renames.is_empty());
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].path, PathBuf::from("/d/x_ar.vtt"));

    let items = c.plan(&fs, Path::new("/d")).unwrap();
    let legacy = items.iter().find(|i| i.path == Path::new("/d/x_ar.vtt")).unwrap();
    assert_eq!(legacy.action, PlannedAction::Skip(SkipReason::LegacyConflict));
}

#[test]
fn test_migrate_legacy_withTaggedSourceAlreadyPresent_shouldNotOverwrite() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/d/x_ar.vtt", ARABIC_VTT);
    fs.add_file("/d/x.vtt", ENGLISH_VTT);
    fs.add_file("/d/x_en.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nOlder copy\n");

    let report = classifier().migrate_legacy(&fs, Path::new("/d")).unwrap();

    assert!(report.renames.is_empty());
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(fs.content("/d/x.vtt").as_deref(), Some(ENGLISH_VTT));
    assert_eq!(fs.content("/d/x_ar.vtt").as_deref(), Some(ARABIC_VTT));
    assert!(fs.content("/d/x_en.vtt").unwrap().contains("Older copy"));
}

#[test]
fn test_prepare_withRawSource_shouldMoveItToTaggedName() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/d/intro.srt", ENGLISH_SRT);
    let c = classifier();

    let items = c.plan(&fs, Path::new("/d")).unwrap();
    let source = c.prepare(&fs, &items[0]).unwrap();

    assert_eq!(source, PathBuf::from("/d/intro_en.srt"));
    assert!(!fs.exists(Path::new("/d/intro.srt")));
    assert_eq!(fs.content("/d/intro_en.srt").as_deref(), Some(ENGLISH_SRT));
}

/// An untranslated file with a legacy tag is a source whose output drops the tag
#[test]
fn test_plan_withUntranslatedLegacyName_shouldTranslateIntoUntaggedName() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/d/notes_ar.srt", ENGLISH_SRT);
    let c = classifier();

    let items = c.plan(&fs, Path::new("/d")).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].role, FileRole::RawSource);
    assert_eq!(
        items[0].action,
        PlannedAction::RenameThenTranslate { tagged: PathBuf::from("/d/notes_en.srt") }
    );
    assert_eq!(items[0].output_path, PathBuf::from("/d/notes.srt"));
}

#[test]
fn test_plan_withUntranslatedLegacyNameAndTakenSlot_shouldLeaveItAlone() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/d/notes_ar.srt", ENGLISH_SRT);
    fs.add_file("/d/notes_en.srt", ENGLISH_SRT);

    let items = classifier().plan(&fs, Path::new("/d")).unwrap();

    let paths: Vec<&Path> = items.iter().map(|i| i.path.as_path()).collect();
    assert_eq!(paths, vec![Path::new("/d/notes_en.srt")]);
    assert_eq!(items[0].output_path, PathBuf::from("/d/notes.srt"));
}
