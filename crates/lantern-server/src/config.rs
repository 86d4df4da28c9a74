use std::env;

use lantern_pipeline::vendors::openrouter::OpenRouterConfig;
use lantern_pipeline::{PipelineError, SearxngConfig};

/// Initialize the environment variables from `.env` when present.
pub fn init() {
    dotenvy::dotenv().ok();
}

/// Server configuration resolved from the environment.
///
/// Variables:
/// - `LANTERN_BIND_ADDR`: listen address (default `0.0.0.0:8080`).
/// - `SEARXNG_URL`: base URL of the SearXNG instance (required).
/// - `OPENROUTER_API_KEY`: completion provider key (required).
/// - `LANTERN_MODEL`: optional model slug override.
/// - `LANTERN_REFERER` / `LANTERN_APP_TITLE`: optional attribution headers.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub searxng: SearxngConfig,
    pub openrouter: OpenRouterConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        let bind_addr =
            env::var("LANTERN_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let searxng_url = env::var("SEARXNG_URL").unwrap_or_default();
        if searxng_url.trim().is_empty() {
            return Err(PipelineError::Config(
                "missing SEARXNG_URL for the search provider".into(),
            ));
        }

        let mut openrouter = OpenRouterConfig::from_env()?;
        if let Ok(model) = env::var("LANTERN_MODEL")
            && !model.trim().is_empty()
        {
            openrouter = openrouter.model(model);
        }
        if let (Ok(referer), Ok(title)) = (env::var("LANTERN_REFERER"), env::var("LANTERN_APP_TITLE"))
        {
            openrouter = openrouter.attribution(referer, title);
        }

        Ok(Self {
            bind_addr,
            searxng: SearxngConfig::new(searxng_url),
            openrouter,
        })
    }
}
