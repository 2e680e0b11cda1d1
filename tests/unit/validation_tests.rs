/*!
 * Tests for reply parsing and batch plausibility checks
 */

use rtlsub::app_config::ValidationConfig;
use rtlsub::language_utils::Script;
use rtlsub::translation::parse_response;
use rtlsub::validation::TranslationValidator;
use rtlsub::validation::service::{REASON_MISSING_TARGET_LANGUAGE, REASON_OK, REASON_TOO_MUCH_ECHOING};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_response_withoutList_shouldReturnNone() {
    assert_eq!(parse_response("I cannot help with that request."), None);
    assert_eq!(parse_response("] backwards ["), None);
    assert_eq!(parse_response(r#"[1, 2, 3]"#), None);
}

#[test]
fn test_parse_response_withUnicodeEscapes_shouldDecode() {
    let parsed = parse_response(r#"Result: ["مرحبا"]"#);
    assert_eq!(parsed, Some(strings(&["مرحبا"])));
}

/// Code and commands may stay in the source language
#[test]
fn test_validate_withCodeLinesUntranslated_shouldAccept() {
    let validator = TranslationValidator::new(ValidationConfig::default(), Script::Arabic);
    let originals = strings(&[
        "Now run the following command in the terminal",
        "npm install --save-dev typescript ts-node",
        "const server = http.createServer(handler);",
        "And that is how we start the server",
    ]);
    let translations = strings(&[
        "الآن شغل الأمر التالي في الطرفية",
        "npm install --save-dev typescript ts-node",
        "const server = http.createServer(handler);",
        "وهكذا نبدأ تشغيل الخادم",
    ]);

    let verdict = validator.validate(&originals, &translations);

    assert!(verdict.accepted);
    assert_eq!(verdict.reason, REASON_OK);
    assert_eq!(verdict.missing_count, 0);
}

/// Short technical terms are never held against a translation
#[test]
fn test_validate_withShortTermsOnly_shouldAccept() {
    let validator = TranslationValidator::new(ValidationConfig::default(), Script::Arabic);
    let originals = strings(&["API", "React hooks", "JSON schema validation"]);

    let verdict = validator.validate(&originals, &originals);

    assert!(verdict.accepted);
    assert_eq!(verdict.echo_count, 0);
}

#[test]
fn test_validate_withEchoesIgnoringCase_shouldReject() {
    let validator = TranslationValidator::new(ValidationConfig::default(), Script::Arabic);
    let originals = strings(&["Welcome back to the course everyone", "Let us get started right now"]);
    let translations = strings(&["  welcome back to the course everyone ", "لنبدأ الآن"]);

    let verdict = validator.validate(&originals, &translations);

    assert!(!verdict.accepted);
    assert_eq!(verdict.reason, REASON_TOO_MUCH_ECHOING);
    assert_eq!(verdict.echo_count, 1);
}

#[test]
fn test_for_language_withHebrewTarget_shouldExpectHebrewScript() {
    let validator = TranslationValidator::for_language(ValidationConfig::default(), "he");
    assert_eq!(validator.script(), Script::Hebrew);

    let originals = strings(&["This sentence should be translated properly"]);
    let arabic = strings(&["هذه الجملة يجب أن تترجم بشكل صحيح"]);
    let hebrew = strings(&["המשפט הזה צריך להיות מתורגם כראוי"]);

    let verdict = validator.validate(&originals, &arabic);
    assert!(!verdict.accepted);
    assert_eq!(verdict.reason, REASON_MISSING_TARGET_LANGUAGE);

    assert!(validator.validate(&originals, &hebrew).accepted);
}

#[test]
fn test_validate_withCustomLimits_shouldUseConfiguredRatios() {
    let config = ValidationConfig {
        echo_ratio_limit: 0.0,
        missing_ratio_limit: 1.0,
        min_words_for_check: 1,
    };
    let validator = TranslationValidator::new(config, Script::Arabic);

    let originals = strings(&["hello there", "good morning"]);
    let translations = strings(&["hello there", "صباح الخير"]);

    assert!(!validator.validate(&originals, &translations).accepted);
    assert!(validator.validate(&originals, &strings(&["أهلا", "صباح الخير"])).accepted);
}

/// Two untranslated terms in a batch of ten do not sink it
#[test]
fn test_validate_withTwoShortTermsAmongTen_shouldAccept() {
    let validator = TranslationValidator::new(ValidationConfig::default(), Script::Arabic);
    let mut originals = strings(&[
        "Welcome to the first lesson of this course",
        "Today we will learn about variables and types",
        "Please open your editor before we begin",
        "We will build a small web server together",
        "Make sure your tools are installed correctly",
        "Every request goes through the same handler",
        "The response is sent back as plain text",
        "Let us test it in the browser now",
    ]);
    let mut translations = strings(&[
        "مرحبا بكم في الدرس الأول من هذه الدورة",
        "سنتعلم اليوم عن المتغيرات والأنواع",
        "يرجى فتح المحرر قبل أن نبدأ",
        "سنبني خادم ويب صغير معا",
        "تأكد من تثبيت أدواتك بشكل صحيح",
        "كل طلب يمر عبر نفس المعالج",
        "يتم إرسال الرد كنص عادي",
        "لنختبره في المتصفح الآن",
    ]);
    originals.extend(strings(&["API", "JSON"]));
    translations.extend(strings(&["API", "JSON"]));

    let verdict = validator.validate(&originals, &translations);

    assert!(verdict.accepted, "{:?}", verdict);
    assert_eq!(verdict.echo_count, 0);
    assert_eq!(verdict.missing_count, 0);
}

/// Sentences starting with words like `for` or `if` are still prose that needs translating
#[test]
fn test_validate_withKeywordLedEnglishReply_shouldReject() {
    let validator = TranslationValidator::new(ValidationConfig::default(), Script::Arabic);
    let originals = strings(&[
        "For example, we create a new file here",
        "If you open the terminal, you will see it",
        "Git is a version control tool we use daily",
        "Import this file into the project folder",
        "Now everything is ready to go",
    ]);
    let translations = strings(&[
        "for example we create a brand new file",
        "if you open the terminal now you see it",
        "git is a version control tool for teams",
        "import this file into the project",
        "الآن كل شيء جاهز للانطلاق",
    ]);

    let verdict = validator.validate(&originals, &translations);

    assert!(!verdict.accepted);
    assert_eq!(verdict.reason, REASON_MISSING_TARGET_LANGUAGE);
    assert_eq!(verdict.missing_count, 4);
}
