#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::domain::models::CompletionService;
use crate::domain::models::Turn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [Turn],
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: Option<CompletionMessageResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoiceResponse>,
}

/// Chat completion endpoint speaking the `{ messages }` request and
/// `choices[0].message.content` response shapes. The endpoint applies its own
/// access control, no credentials are sent.
pub struct HttpCompletion {
    url: String,
    timeout: u64,
}

impl HttpCompletion {
    pub fn new(url: &str, timeout: u64) -> HttpCompletion {
        return HttpCompletion {
            url: url.to_string(),
            timeout,
        };
    }
}

#[async_trait]
impl CompletionService for HttpCompletion {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Completion URL is not defined");
        }

        let scheme = reqwest::Url::parse(&self.url)
            .map(|url| return url.scheme().to_string())
            .unwrap_or_default();
        if scheme != "http" && scheme != "https" {
            bail!(format!("Completion URL {} is not a valid http(s) URL", self.url));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, turns: &[Turn]) -> Result<String> {
        let req = CompletionRequest { messages: turns };

        let res = reqwest::Client::new()
            .post(&self.url)
            .timeout(Duration::from_millis(self.timeout))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request"
            );
            bail!(format!(
                "The completion service responded with status {}",
                res.status().as_u16()
            ));
        }

        let body = res.json::<CompletionResponse>().await?;
        tracing::debug!(body = ?body, "Completion response");

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| return choice.message)
            .and_then(|message| return message.content);

        match content {
            Some(text) if !text.trim().is_empty() => return Ok(text),
            _ => bail!("The completion service returned no answer"),
        }
    }
}
