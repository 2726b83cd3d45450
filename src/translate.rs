/// Cross-lingual translation
///
/// Thin client over the public Google translate endpoint (`client=gtx`),
/// auto-detecting the source language and translating into the configured
/// analysis language. Translation is best effort: the monitor loop falls
/// back to the untranslated text when a request fails.
use serde_json::Value;
use std::time::Duration;

use crate::error::TranslateError;
use crate::monitor::Translator;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GtxTranslator {
    agent: ureq::Agent,
    target: String,
}

impl GtxTranslator {
    /// # Arguments
    /// * `target` - ISO 639-1 code of the analysis language, e.g. "en"
    pub fn new(target: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            target: target.to_string(),
        }
    }
}

impl Translator for GtxTranslator {
    fn translate(&mut self, text: &str) -> Result<String, TranslateError> {
        let response = self
            .agent
            .get(ENDPOINT)
            .query("client", "gtx")
            .query("sl", "auto")
            .query("tl", &self.target)
            .query("dt", "t")
            .query("q", text)
            .call()
            .map_err(|e| TranslateError::RequestFailed(Box::new(e)))?;

        let body: Value = response
            .into_json()
            .map_err(|e| TranslateError::RequestFailed(Box::new(e)))?;

        concat_segments(&body).ok_or(TranslateError::MalformedResponse)
    }
}

/// The endpoint answers with a nested array; element 0 is the list of
/// translated segments, each `[translated, original, ...]`.
fn concat_segments(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;

    let mut out = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            out.push_str(part);
        }
    }

    let out = out.trim().to_string();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
