//! Article summaries from the Gemini `generateContent` API.
//!
//! Summaries are best effort: every failure degrades to a fixed string and
//! nothing here can fail a request.

use std::time::Duration;

use scraper::Html;

use crate::config::Config;

pub const FALLBACK_NO_KEY: &str = "Resum no disponible (clau API no configurada).";
pub const FALLBACK_ERROR: &str = "Error en connectar amb l'assistent intel·ligent.";
pub const FALLBACK_EMPTY: &str = "No s'ha pogut generar el resum.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Summarization service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("Summarization service returned no text")]
    Empty,
}

pub struct Summarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl Summarizer {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.summary_model.clone(),
            config.summary_base_url.clone(),
        )
    }

    /// Short motivational summary of `content`, or a fallback string.
    pub async fn summarize(&self, content: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return FALLBACK_NO_KEY.to_string();
        };

        match self.generate(api_key, &build_prompt(content)).await {
            Ok(text) => text,
            Err(SummaryError::Empty) => {
                tracing::warn!(model = %self.model, "Empty summary response");
                FALLBACK_EMPTY.to_string()
            }
            Err(e) => {
                tracing::warn!(model = %self.model, "Summary failed: {}", e);
                FALLBACK_ERROR.to_string()
            }
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = serde_json::json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummaryError::ExternalServiceUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(SummaryError::ExternalServiceUnavailable(format!(
                "returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            SummaryError::ExternalServiceUnavailable(format!("response parse failed: {e}"))
        })?;

        extract_text(&json).ok_or(SummaryError::Empty)
    }
}

fn build_prompt(content: &str) -> String {
    format!(
        "Resumeix la següent notícia corporativa per a un operari de fàbrica enfeinat. \
         Fes servir un to motivador i breu (màxim 2 frases). Contingut: {}",
        strip_markup(content)
    )
}

/// `candidates[0].content.parts[0].text`, if present and non-blank.
fn extract_text(json: &serde_json::Value) -> Option<String> {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

/// Visible text of an article body, whitespace collapsed; entities decoded.
fn strip_markup(content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
