//! Language detection, translation, and multilingual query expansion.
//!
//! Detection is probabilistic on short strings, so every outcome in this
//! module is advisory: detectors return `None` rather than erroring,
//! translators return `None` when no translation is available, and the
//! original-language query is always kept as the guaranteed fallback path.

use async_trait::async_trait;
use tracing::{debug, warn};

/// Texts shorter than this (after trimming) are never detected.
const MIN_DETECT_CHARS: usize = 10;

/// At most this many leading characters are fed to the detector.
const DETECT_SAMPLE_CHARS: usize = 1000;

/// Chunks sampled when voting on a document's language.
pub const DOC_LANG_SAMPLE_SIZE: usize = 5;

/// A language detection capability.
///
/// Returns an opaque language code, or `None` when the text is too short or
/// the language cannot be determined. Implementations must be deterministic:
/// identical input yields an identical result.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`.
    fn detect(&self, text: &str) -> Option<String>;
}

/// The default detector, backed by `whatlang`.
///
/// Produces ISO 639-3 codes (`eng`, `fra`, `rus`, ...). Detection is pure
/// and deterministic, satisfying the repeated-call stability requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_DETECT_CHARS {
            return None;
        }
        let sample: String = trimmed.chars().take(DETECT_SAMPLE_CHARS).collect();
        let info = whatlang::detect(&sample)?;
        let code = info.lang().code().to_string();
        debug!(lang = %code, confidence = info.confidence(), "detected language");
        Some(code)
    }
}

/// Detect a document's language by sampling chunks evenly across it.
///
/// Samples up to `sample_size` chunks at a stride of
/// `len(chunks) / sample_size`, so the vote covers the whole document rather
/// than just an unrepresentative prefix. Returns the plurality language;
/// ties break toward the first-encountered maximum.
pub fn detect_document_language<D: LanguageDetector + ?Sized>(
    detector: &D,
    texts: &[String],
    sample_size: usize,
) -> Option<String> {
    if texts.is_empty() || sample_size == 0 {
        return None;
    }

    let stride = std::cmp::max(1, texts.len() / sample_size);
    // First-encounter order doubles as the tie-break order.
    let mut votes: Vec<(String, usize)> = Vec::new();
    for text in texts.iter().step_by(stride).take(sample_size) {
        if let Some(lang) = detector.detect(text) {
            match votes.iter_mut().find(|(l, _)| *l == lang) {
                Some((_, count)) => *count += 1,
                None => votes.push((lang, 1)),
            }
        }
    }

    // Only a strictly greater count displaces the running maximum, so a tie
    // resolves to the first-encountered language.
    let (winner, count) = votes
        .iter()
        .fold(None::<&(String, usize)>, |best, vote| match best {
            Some(b) if b.1 >= vote.1 => Some(b),
            _ => Some(vote),
        })?
        .clone();
    debug!(lang = %winner, votes = count, sampled = votes.iter().map(|(_, c)| c).sum::<usize>(), "document language vote");
    Some(winner)
}

/// `true` iff both languages are known and differ.
pub fn should_translate(query_lang: Option<&str>, doc_lang: Option<&str>) -> bool {
    match (query_lang, doc_lang) {
        (Some(q), Some(d)) => q != d,
        _ => false,
    }
}

/// A best-effort translation capability.
///
/// `None` means "no translation available" and is never an error; callers
/// must continue with the original text.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang` (a detector-produced code).
    ///
    /// Returns the input unchanged when it already is in the target
    /// language, and `None` on any underlying failure.
    async fn translate(&self, text: &str, target_lang: &str) -> Option<String>;
}

/// A [`Translator`] that never translates.
///
/// The default for deployments without a translation endpoint; retrieval
/// then always runs on the original query alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTranslator;

#[async_trait]
impl Translator for NoOpTranslator {
    async fn translate(&self, _text: &str, _target_lang: &str) -> Option<String> {
        None
    }
}

/// A [`Translator`] backed by a LibreTranslate-style HTTP endpoint.
///
/// Posts `{ q, source, target, format }` to `<base_url>/translate` and reads
/// `translatedText` from the response. Every failure degrades to `None`.
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    detector: WhatlangDetector,
}

impl HttpTranslator {
    /// Create a translator for the endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            detector: WhatlangDetector,
        }
    }

    /// Attach an API key sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(serde::Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Option<String> {
        let source = self.detector.detect(text);
        if source.as_deref() == Some(target_lang) {
            return Some(text.to_string());
        }

        let body = TranslateRequest {
            q: text,
            source: source.as_deref().unwrap_or("auto"),
            target: target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), target = target_lang, "translation request rejected");
                return None;
            }
            Err(e) => {
                warn!(error = %e, target = target_lang, "translation request failed");
                return None;
            }
        };

        match response.json::<TranslateResponse>().await {
            Ok(parsed) => {
                debug!(target = target_lang, "translated query variant");
                Some(parsed.translated_text)
            }
            Err(e) => {
                warn!(error = %e, "failed to parse translation response");
                None
            }
        }
    }
}

/// Build the query variant list for retrieval.
///
/// The original query always comes first. When the query and document
/// languages are both known and differ, one translation into the document's
/// language is attempted and appended — only if it succeeded and actually
/// differs from the original. With no document language there is no target
/// to translate toward, so the list stays at one variant.
pub async fn expand_query<D, T>(
    detector: &D,
    translator: &T,
    query: &str,
    doc_lang: Option<&str>,
) -> Vec<String>
where
    D: LanguageDetector + ?Sized,
    T: Translator + ?Sized,
{
    let mut variants = vec![query.to_string()];

    let query_lang = detector.detect(query);
    if should_translate(query_lang.as_deref(), doc_lang) {
        // doc_lang is Some here by should_translate's contract.
        let target = doc_lang.unwrap_or_default();
        if let Some(translated) = translator.translate(query, target).await {
            if translated != query {
                variants.push(translated);
            }
        }
    }

    debug!(variants = variants.len(), "expanded query");
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Detector scripted by text prefix, for vote tests.
    struct PrefixDetector;

    impl LanguageDetector for PrefixDetector {
        fn detect(&self, text: &str) -> Option<String> {
            text.split(':').next().filter(|p| *p != "??").map(str::to_string)
        }
    }

    struct FixedTranslator(Option<String>);

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(&self, _text: &str, _target_lang: &str) -> Option<String> {
            self.0.clone()
        }
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = WhatlangDetector;
        let text = "The quick brown fox jumps over the lazy dog near the river bank.";
        assert_eq!(detector.detect(text), detector.detect(text));
    }

    #[test]
    fn detects_english_and_russian() {
        let detector = WhatlangDetector;
        assert_eq!(
            detector.detect("The weather today is sunny with a light breeze from the coast."),
            Some("eng".to_string())
        );
        assert_eq!(
            detector.detect("Сегодня солнечная погода с лёгким ветром с побережья."),
            Some("rus".to_string())
        );
    }

    #[test]
    fn short_text_fails_soft() {
        assert_eq!(WhatlangDetector.detect("hi there"), None);
        assert_eq!(WhatlangDetector.detect("   a   "), None);
    }

    #[test]
    fn document_vote_takes_plurality() {
        let texts: Vec<String> =
            ["eng:a", "eng:b", "fra:c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            detect_document_language(&PrefixDetector, &texts, 5),
            Some("eng".to_string())
        );
    }

    #[test]
    fn document_vote_tie_breaks_to_first_encountered() {
        let texts: Vec<String> =
            ["fra:a", "eng:b", "eng:c", "fra:d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            detect_document_language(&PrefixDetector, &texts, 5),
            Some("fra".to_string())
        );
    }

    #[test]
    fn document_vote_samples_with_stride() {
        // 10 chunks, sample 5 -> stride 2: indexes 0, 2, 4, 6, 8.
        let texts: Vec<String> = (0..10)
            .map(|i| if i % 2 == 0 { format!("eng:{i}") } else { format!("fra:{i}") })
            .collect();
        assert_eq!(
            detect_document_language(&PrefixDetector, &texts, 5),
            Some("eng".to_string())
        );
    }

    #[test]
    fn document_vote_ignores_undetectable_chunks() {
        let texts: Vec<String> = ["??:a", "rus:b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            detect_document_language(&PrefixDetector, &texts, 5),
            Some("rus".to_string())
        );
        let unknown: Vec<String> = ["??:a", "??:b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(detect_document_language(&PrefixDetector, &unknown, 5), None);
    }

    #[test]
    fn should_translate_truth_table() {
        assert!(should_translate(Some("fra"), Some("eng")));
        assert!(!should_translate(Some("eng"), Some("eng")));
        assert!(!should_translate(None, Some("eng")));
        assert!(!should_translate(Some("fra"), None));
        assert!(!should_translate(None, None));
    }

    #[tokio::test]
    async fn expand_keeps_original_first_and_appends_translation() {
        let query = "Quelle est la conclusion principale de ce document ?";
        let variants = expand_query(
            &WhatlangDetector,
            &FixedTranslator(Some("What is the main conclusion of this document?".into())),
            query,
            Some("eng"),
        )
        .await;
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0], query);
    }

    #[tokio::test]
    async fn expand_skips_translation_without_document_language() {
        let variants = expand_query(
            &WhatlangDetector,
            &FixedTranslator(Some("should not be used".into())),
            "Quelle est la conclusion principale de ce document ?",
            None,
        )
        .await;
        assert_eq!(variants.len(), 1);
    }

    #[tokio::test]
    async fn expand_drops_failed_and_identical_translations() {
        let query = "Quelle est la conclusion principale de ce document ?";
        let failed =
            expand_query(&WhatlangDetector, &FixedTranslator(None), query, Some("eng")).await;
        assert_eq!(failed.len(), 1);

        let identical =
            expand_query(&WhatlangDetector, &FixedTranslator(Some(query.into())), query, Some("eng"))
                .await;
        assert_eq!(identical.len(), 1);
    }
}
