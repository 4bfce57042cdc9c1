// OpenAI chat-completions client for store rating
//
// One blocking request per store. The reply must be a JSON object with
// health and economy scores; see score.rs for how it is interpreted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::rating::StoreScorer;
use crate::score::{RawScore, StorePayload};

pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// OpenAI API types
// ============================================================================

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    response_format: Option<OpenAIResponseFormat>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, ScoreError> {
        Self::with_base_url(api_key, model, OPENAI_API_BASE.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, ScoreError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScoreError::NetworkError(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model to rate one store.
    ///
    /// Transport and envelope failures are errors. Reply content that holds no
    /// JSON object is not: it yields an empty `RawScore` so the caller falls
    /// back to default scores.
    pub fn rate(&self, store: &StorePayload) -> Result<RawScore, ScoreError> {
        let payload = serde_json::to_string(store)
            .map_err(|e| ScoreError::InvalidResponse(e.to_string()))?;

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: build_system_prompt(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: format!("Rate this store: {}", payload),
                },
            ],
            temperature: TEMPERATURE,
            response_format: Some(OpenAIResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| ScoreError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<OpenAIError>(&error_text) {
                return Err(ScoreError::ApiError {
                    status: status.as_u16(),
                    message: error.error.message,
                });
            }
            return Err(ScoreError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: OpenAIResponse = response
            .json()
            .map_err(|e| ScoreError::ParseError(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ScoreError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(RawScore::from_reply(&content).unwrap_or_else(|| {
            log::debug!("reply held no JSON object: {:?}", content);
            RawScore::default()
        }))
    }
}

impl StoreScorer for OpenAiClient {
    fn score(&self, store: &StorePayload) -> Result<RawScore, ScoreError> {
        self.rate(store)
    }
}

fn build_system_prompt() -> String {
    r#"You rate food retail locations for nutrition-conscious SNAP users.

HEALTH (1-10):
- General menu health
- Fresh produce and whole foods versus ultra-processed food
- Manipulative portion sizes or menu items
- Store type: grocery > super store > convenience > restaurant meals
- Name signals are important
Be conservative: 10 = excellent access to healthy foods, 1 = very poor.

ECONOMY (1-5):
- Typical prices at this retailer: 5 = very economical, 1 = very expensive.

Return ONLY strict JSON, no markdown:
{"score": <integer 1-10>, "reason": "short reason", "economy_score": <integer 1-5>, "economy_reason": "short reason"}"#
        .to_string()
}
