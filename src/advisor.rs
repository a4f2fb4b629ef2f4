//! Flavor text shown above the icon grid. Purely decorative: nothing in the
//! round state machine waits on it, and every failure collapses into a fixed
//! fallback line.

use crate::icons::GAME_ICONS;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use itertools::Itertools;
use reqwest::StatusCode;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    future::Future,
    sync::Arc,
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::{
    debug,
    warn,
};

pub const DEFAULT_ADVISOR_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Used when the provider answers with nothing.
pub const EMPTY_RESPONSE_INSIGHT: &str = "The stars are aligning for a great win.";
/// Used when the provider cannot be reached or errors.
pub const FALLBACK_INSIGHT: &str = "Fortune favors the bold tonight.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub trait PredictionSource: Send + Sync + 'static {
    fn predict(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

pub fn prediction_prompt() -> String {
    let names = GAME_ICONS.iter().map(|def| def.display_name).join(", ");
    format!(
        "You are a mystical game assistant for a betting game with 12 icons: {names}. \
         Give a short (1 sentence) mysterious prediction about which icon might be lucky next. \
         Be poetic."
    )
}

pub fn insight_or_fallback(result: Result<String>) -> String {
    match result {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                EMPTY_RESPONSE_INSIGHT.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            warn!(error = %e, "prediction request failed, using fallback");
            FALLBACK_INSIGHT.to_string()
        }
    }
}

pub async fn fetch_insight<P: PredictionSource>(source: &P) -> String {
    let prompt = prediction_prompt();
    insight_or_fallback(source.predict(&prompt).await)
}

/// Fire-and-forget request; the text arrives on `tx` whenever it is ready.
pub fn spawn_insight<P: PredictionSource>(
    source: Arc<P>,
    tx: mpsc::UnboundedSender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let insight = fetch_insight(source.as_ref()).await;
        if tx.send(insight).is_err() {
            debug!("insight receiver dropped");
        }
    })
}

#[derive(Clone)]
pub struct GeminiAdvisor {
    base_url: String,
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiAdvisor {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .wrap_err("failed to build HTTP client for advisor")?;
        Ok(Self {
            base_url,
            model: model.into(),
            api_key: api_key.into(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl PredictionSource for GeminiAdvisor {
    async fn predict(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequestDto {
            contents: vec![ContentDto {
                parts: vec![PartDto {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .wrap_err("advisor request failed")?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .wrap_err("failed to read advisor response body")?;
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(eyre!("advisor rate limited"));
        }
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(eyre!("advisor responded with {status}: {body}"));
        }
        let dto: GenerateResponseDto =
            serde_json::from_slice(&bytes).wrap_err("invalid advisor payload")?;
        Ok(dto.first_text())
    }
}

/// Offline provider; always answers with the same line.
#[derive(Clone, Debug, Default)]
pub struct StaticAdvisor;

impl PredictionSource for StaticAdvisor {
    async fn predict(&self, _prompt: &str) -> Result<String> {
        Ok(FALLBACK_INSIGHT.to_string())
    }
}

#[derive(Clone)]
pub enum Advisor {
    Gemini(GeminiAdvisor),
    Static(StaticAdvisor),
}

impl PredictionSource for Advisor {
    async fn predict(&self, prompt: &str) -> Result<String> {
        match self {
            Advisor::Gemini(gemini) => gemini.predict(prompt).await,
            Advisor::Static(fixed) => fixed.predict(prompt).await,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequestDto {
    contents: Vec<ContentDto>,
}

#[derive(Serialize, Deserialize, Default)]
struct ContentDto {
    #[serde(default)]
    parts: Vec<PartDto>,
}

#[derive(Serialize, Deserialize)]
struct PartDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponseDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Deserialize)]
struct CandidateDto {
    #[serde(default)]
    content: ContentDto,
}

impl GenerateResponseDto {
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    struct Failing;

    impl PredictionSource for Failing {
        async fn predict(&self, _prompt: &str) -> Result<String> {
            Err(eyre!("connection refused"))
        }
    }

    struct Echo(&'static str);

    impl PredictionSource for Echo {
        async fn predict(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn prediction_prompt__names_every_icon() {
        let prompt = prediction_prompt();
        for def in GAME_ICONS.iter() {
            assert!(prompt.contains(def.display_name), "{}", def.display_name);
        }
    }

    #[tokio::test]
    async fn fetch_insight__failure_maps_to_fallback() {
        assert_eq!(fetch_insight(&Failing).await, FALLBACK_INSIGHT);
    }

    #[tokio::test]
    async fn fetch_insight__blank_response_maps_to_default_line() {
        assert_eq!(fetch_insight(&Echo("  \n")).await, EMPTY_RESPONSE_INSIGHT);
    }

    #[tokio::test]
    async fn fetch_insight__trims_provider_text() {
        assert_eq!(
            fetch_insight(&Echo(" The rose stirs. \n")).await,
            "The rose stirs."
        );
    }

    #[tokio::test]
    async fn spawn_insight__delivers_text_on_channel() {
        // given
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when
        spawn_insight(Arc::new(Failing), tx).await.unwrap();

        // then
        assert_eq!(rx.recv().await.as_deref(), Some(FALLBACK_INSIGHT));
    }

    #[test]
    fn first_text__joins_parts_of_first_candidate() {
        // given
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"The kite "},{"text":"soars."}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;

        // when
        let dto: GenerateResponseDto = serde_json::from_str(raw).unwrap();

        // then
        assert_eq!(dto.first_text(), "The kite soars.");
    }

    #[test]
    fn first_text__empty_when_no_candidates() {
        let dto: GenerateResponseDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto.first_text(), "");
    }
}
