use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use backend_domain::ports::{NarrativeError, NarrativeProvider};
use backend_domain::AnomalyRecord;

const SYSTEM_INSTRUCTION: &str = "You are a financial fraud analyst assistant. \
Write a concise, two-sentence summary explaining why a transaction was flagged \
as anomalous. Base the summary exclusively on the data provided; be factual and \
direct, and mention the amount, location, time, and the detected anomaly reasons.";

/// Narrative provider backed by the Gemini generateContent API.
pub struct GeminiNarrator {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiNarrator {
    pub fn new(api_key: String, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }

    /// Prompt built strictly from the record's own fields; no cross-row
    /// context reaches the model.
    fn build_prompt(record: &AnomalyRecord) -> String {
        let txn = &record.transaction;
        format!(
            "Transaction Data:\n\
- Transaction ID: {}\n\
- Account ID: {}\n\
- Amount: ${:.2}\n\
- Location: {}\n\
- Time: {} on {}\n\
- Account's Average Daily Spend: ${:.2}\n\
- Detected Anomaly Reasons: {}\n\n\
Please generate the summary now.",
            txn.transaction_id,
            txn.account_id,
            txn.amount,
            txn.location,
            txn.timestamp.format("%H:%M:%S"),
            txn.timestamp.format("%Y-%m-%d"),
            txn.avg_daily_spend,
            record.anomaly_type(),
        )
    }

    fn build_request_body(prompt: &str, temperature: f32, max_tokens: u32) -> serde_json::Value {
        json!({
            "system_instruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        })
    }
}

#[async_trait]
impl NarrativeProvider for GeminiNarrator {
    async fn narrate(&self, record: &AnomalyRecord) -> Result<String, NarrativeError> {
        if self.api_key.trim().is_empty() {
            return Err(NarrativeError::NotConfigured("GEMINI_API_KEY not set".into()));
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key,
        );
        let body = Self::build_request_body(&Self::build_prompt(record), self.temperature, self.max_tokens);

        debug!("Gemini request for {}", record.transaction.transaction_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| NarrativeError::Http(err.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api { status, body });
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|err| NarrativeError::Http(err.to_string()))?;
        let content = parsed["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                NarrativeError::Parse("missing candidates[0].content.parts[0].text".into())
            })?;

        Ok(content.trim().replace('\n', " "))
    }
}

/// Deterministic fallback used when no API key is configured, so the
/// pipeline still produces a readable explanation per row.
#[derive(Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NarrativeProvider for TemplateNarrator {
    async fn narrate(&self, record: &AnomalyRecord) -> Result<String, NarrativeError> {
        let txn = &record.transaction;
        Ok(format!(
            "Transaction {} on account {} for ${:.2} at {} ({} {}) was flagged: {}. \
The account's average daily spend is ${:.2}.",
            txn.transaction_id,
            txn.account_id,
            txn.amount,
            txn.location,
            txn.timestamp.format("%Y-%m-%d"),
            txn.timestamp.format("%H:%M:%S"),
            record.anomaly_type(),
            txn.avg_daily_spend,
        ))
    }
}
