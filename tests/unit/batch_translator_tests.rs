/*!
 * Tests for the retrying, bisecting batch translator
 */

use std::sync::Arc;
use std::time::Duration;

use rtlsub::app_config::ValidationConfig;
use rtlsub::errors::TranslationError;
use rtlsub::language_utils::Script;
use rtlsub::providers::mock::{MockBehavior, MockProvider};
use rtlsub::translation::formatting::{PDF, RLE, wrap_rtl};
use rtlsub::translation::{BatchSettings, BatchTranslator};
use rtlsub::validation::TranslationValidator;

fn settings(max_retries: u32, wrap: bool) -> BatchSettings {
    BatchSettings {
        max_retries,
        min_split_size: 1,
        rate_limit_cooldown: Duration::ZERO,
        min_rate_limit_cooldown: Duration::ZERO,
        temperature: 0.1,
        wrap_rtl: wrap,
    }
}

fn translator(provider: &MockProvider, max_retries: u32) -> BatchTranslator {
    BatchTranslator::new(
        Arc::new(provider.clone()),
        "Translate from English to Arabic.",
        TranslationValidator::new(ValidationConfig::default(), Script::Arabic),
        settings(max_retries, true),
    )
}

fn lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("This is subtitle line number {} of the lesson", i))
        .collect()
}

fn expected(batch: &[String]) -> Vec<String> {
    batch
        .iter()
        .map(|l| wrap_rtl(&MockProvider::translate_line(l)))
        .collect()
}

/// Output is index-aligned with the input for every batch size
#[tokio::test]
async fn test_try_translate_withWorkingProvider_shouldPreserveOrderForAnySize() {
    for n in 1..=50 {
        let provider = MockProvider::working();
        let batch = lines(n);

        let translated = translator(&provider, 2).try_translate(&batch).await.unwrap();

        assert_eq!(translated, expected(&batch), "batch size {}", n);
        assert_eq!(provider.request_count(), 1, "batch size {}", n);
    }
}

/// A provider that never succeeds fails the whole batch after exploring every split
#[tokio::test]
async fn test_try_translate_withFailingProvider_shouldFailWholeBatchForAnySize() {
    for n in 1..=50 {
        let provider = MockProvider::failing();
        let batch = lines(n);

        let result = translator(&provider, 1).try_translate(&batch).await;

        match result {
            Err(TranslationError::Untranslatable { size }) => assert_eq!(size, n),
            other => panic!("batch size {}: unexpected result {:?}", n, other),
        }
        assert_eq!(provider.request_count(), 2 * n - 1, "batch size {}", n);
    }
}

#[tokio::test]
async fn test_try_translate_withIntermittentFailures_shouldRecoverByRetrying() {
    let provider = MockProvider::intermittent(3);
    let translator = translator(&provider, 2);

    for n in [1, 7, 20] {
        let batch = lines(n);
        let translated = translator.try_translate(&batch).await.unwrap();
        assert_eq!(translated, expected(&batch));
    }
}

/// Batches the model can only handle in small pieces still come back complete
#[tokio::test]
async fn test_try_translate_withSmallModelLimit_shouldReassembleInOrder() {
    let provider = MockProvider::new(MockBehavior::MaxBatch { max_lines: 3 });
    let batch = lines(20);

    let translated = translator(&provider, 1).try_translate(&batch).await.unwrap();

    assert_eq!(translated, expected(&batch));
    assert!(provider.request_count() > 1);
}

#[tokio::test]
async fn test_translate_withWrongCountProvider_shouldReturnNone() {
    let provider = MockProvider::wrong_count();
    let batch = lines(4);

    assert_eq!(translator(&provider, 1).translate(&batch).await, None);
}

#[tokio::test]
async fn test_try_translate_withAlwaysRateLimited_shouldGiveUpPerSplit() {
    let provider = MockProvider::rate_limited();
    let batch = lines(3);

    let result = translator(&provider, 2).try_translate(&batch).await;

    assert!(matches!(result, Err(TranslationError::Untranslatable { size: 3 })));
    // Five sub-batches, two attempts each
    assert_eq!(provider.request_count(), 10);
}

#[tokio::test]
async fn test_try_translate_withAuthFailure_shouldStopImmediately() {
    let provider = MockProvider::auth_failing();
    let batch = lines(16);

    let result = translator(&provider, 3).try_translate(&batch).await;

    assert!(matches!(result, Err(TranslationError::Fatal(_))));
    assert_eq!(provider.request_count(), 1);
}

/// Controls the model copied into its reply are not doubled
#[tokio::test]
async fn test_try_translate_withPrewrappedReply_shouldWrapOnce() {
    fn wrapped_reply(lines: &[String]) -> String {
        let out: Vec<String> = lines
            .iter()
            .map(|l| format!("{}{}{}", RLE, MockProvider::translate_line(l), PDF))
            .collect();
        serde_json::to_string(&out).unwrap()
    }

    let provider = MockProvider::working().with_custom_response(wrapped_reply);
    let batch = lines(2);

    let translated = translator(&provider, 1).try_translate(&batch).await.unwrap();

    assert_eq!(translated, expected(&batch));
}

#[tokio::test]
async fn test_try_translate_withWrappingDisabled_shouldReturnPlainLines() {
    let provider = MockProvider::working();
    let translator = BatchTranslator::new(
        Arc::new(provider.clone()),
        "prompt",
        TranslationValidator::new(ValidationConfig::default(), Script::Arabic),
        settings(1, false),
    );
    let batch = lines(2);

    let translated = translator.try_translate(&batch).await.unwrap();

    let plain: Vec<String> = batch.iter().map(|l| MockProvider::translate_line(l)).collect();
    assert_eq!(translated, plain);
}

#[tokio::test]
async fn test_try_translate_shouldSendSystemPromptAndTemperature() {
    let provider = MockProvider::working();
    translator(&provider, 1).try_translate(&lines(2)).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system_prompt, "Translate from English to Arabic.");
    assert_eq!(requests[0].temperature, 0.1);
    assert_eq!(MockProvider::extract_lines(&requests[0].user_message), Some(lines(2)));
}
