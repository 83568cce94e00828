use crate::error::{Error, Result};
use anyhow::Context as _;
use reqwest::{Client, StatusCode};
use serde_json::json;

/// Thin client for the companion AI service's question-answering endpoint.
#[derive(Clone)]
pub struct TutorService {
    client: Client,
    base_url: Option<String>,
}

impl TutorService {
    pub fn new(base_url: Option<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    pub async fn ask(&self, query: &str) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct AskResp {
            answer: String,
        }

        let query = query.trim();
        if query.is_empty() {
            return Err(Error::BadRequest("query must not be empty".to_string()));
        }
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Unavailable("AI tutor is not configured".to_string()))?;

        let resp = self
            .client
            .post(format!("{}/api/ai/ask", base))
            .json(&json!({ "query": query }))
            .send()
            .await
            .context("tutor request failed")?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("AI tutor is rate limited upstream");
            return Err(Error::UpstreamRateLimited(
                "The AI is receiving many requests. Please try again shortly.".to_string(),
            ));
        }
        let txt = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %txt, "AI tutor upstream error");
            return Err(anyhow::anyhow!("tutor status {}", status.as_u16()).into());
        }
        let parsed: AskResp = serde_json::from_str(&txt).context("tutor response parse failed")?;
        Ok(parsed.answer)
    }
}
