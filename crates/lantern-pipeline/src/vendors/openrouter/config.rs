use std::time::Duration;

use crate::errors::PipelineError;

/// Configuration for the OpenRouter completion client.
#[derive(Clone, Debug)]
pub struct OpenRouterConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL for the OpenRouter-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Model slug sent with every request.
    pub model: String,
    /// Value for the `HTTP-Referer` attribution header, when set.
    pub referer: Option<String>,
    /// Value for the `X-Title` attribution header, when set.
    pub app_title: Option<String>,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl OpenRouterConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api".to_string(),
            model: "qwen/qwen-2.5-72b-instruct".to_string(),
            referer: None,
            app_title: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, PipelineError> {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(PipelineError::Config(
                "missing OPENROUTER_API_KEY for OpenRouter provider".into(),
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model slug.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the attribution headers sent to OpenRouter.
    pub fn attribution(mut self, referer: impl Into<String>, app_title: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self.app_title = Some(app_title.into());
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn chat_completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_completions_url_strips_trailing_slash() {
        let config = OpenRouterConfig::new("k").base_url("http://localhost:9999/");
        assert_eq!(
            config.chat_completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }
}
