//! Best-effort localization of free-text profile fields.
//!
//! The localizer is an independent collaborator: its failures never fail
//! quote assembly, they degrade to an empty profile at the call site.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::LocalizeError;
use crate::http_client::{HttpClient, HttpRequest};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Free-text translation contract.
pub trait TextLocalizer: Send + Sync {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LocalizeError>> + Send + 'a>>;
}

/// Client for the unofficial Google Translate `gtx` endpoint.
///
/// The payload is a nested array: element 0 lists translated segments,
/// each segment holding the translated text at index 0. Segments are
/// concatenated in order.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    timeout: Duration,
}

impl GoogleTranslateClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            endpoint: String::from(DEFAULT_ENDPOINT),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TextLocalizer for GoogleTranslateClient {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LocalizeError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
                self.endpoint,
                urlencoding::encode(source_lang),
                urlencoding::encode(target_lang),
                urlencoding::encode(text)
            );

            let response = self
                .http
                .execute(HttpRequest::get(url).with_timeout(self.timeout))
                .await
                .map_err(|error| LocalizeError::Transport {
                    message: error.to_string(),
                })?;

            if !response.is_success() {
                return Err(LocalizeError::Status {
                    status: response.status,
                });
            }

            parse_translation(&response.body)
        })
    }
}

/// Identity localizer for tests and for deployments with translation off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocalizer;

impl TextLocalizer for NoopLocalizer {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        _source_lang: &'a str,
        _target_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LocalizeError>> + Send + 'a>> {
        let text = text.to_owned();
        Box::pin(async move { Ok(text) })
    }
}

fn parse_translation(body: &str) -> Result<String, LocalizeError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LocalizeError::Malformed {
        message: e.to_string(),
    })?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| LocalizeError::Malformed {
            message: String::from("missing translated segment list"),
        })?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(piece);
        }
    }

    if translated.is_empty() {
        return Err(LocalizeError::Malformed {
            message: String::from("payload contained no translated text"),
        });
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::http_client::{HttpError, HttpResponse};

    use super::*;

    /// Transport returning a fixed body and recording requested URLs.
    struct CannedTransport {
        body: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpClient for CannedTransport {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(request.url);
                Ok(HttpResponse {
                    status: 200,
                    body: self.body.to_owned(),
                })
            })
        }
    }

    #[tokio::test]
    async fn translate_queries_configured_endpoint() {
        let transport = CannedTransport::new(r#"[[["Energia","Energy",null,null,3]],null,"en"]"#);
        let client = GoogleTranslateClient::new(Arc::clone(&transport) as Arc<dyn HttpClient>)
            .with_endpoint("http://127.0.0.1:19099/translate_a/single");

        let translated = client.translate("Energy", "en", "pt").await.expect("must translate");

        assert_eq!(translated, "Energia");
        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].starts_with("http://127.0.0.1:19099/translate_a/single?client=gtx"));
        assert!(seen[0].contains("sl=en"));
        assert!(seen[0].contains("tl=pt"));
        assert!(seen[0].ends_with("q=Energy"));
    }

    #[test]
    fn concatenates_translated_segments_in_order() {
        let body = r#"[[["A Petrobras explora ","Petrobras explores ",null,null,3],["e produz petróleo.","and produces oil.",null,null,3]],null,"en"]"#;
        let translated = parse_translation(body).expect("must parse");
        assert_eq!(translated, "A Petrobras explora e produz petróleo.");
    }

    #[test]
    fn rejects_payload_without_segments() {
        let err = parse_translation(r#"{"error":"blocked"}"#).expect_err("must fail");
        assert!(matches!(err, LocalizeError::Malformed { .. }));
    }

    #[test]
    fn rejects_empty_translation() {
        let err = parse_translation(r#"[[],null,"en"]"#).expect_err("must fail");
        assert!(matches!(err, LocalizeError::Malformed { .. }));
    }

    #[tokio::test]
    async fn noop_localizer_echoes_input() {
        let localizer = NoopLocalizer;
        let out = localizer.translate("hello", "en", "pt").await.expect("must echo");
        assert_eq!(out, "hello");
    }
}
