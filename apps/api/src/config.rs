use anyhow::{bail, Context, Result};

const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Which OpenAI-compatible endpoint the LLM client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenRouter,
    OpenAi,
}

impl LlmProvider {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "openai" => Ok(LlmProvider::OpenAi),
            other => bail!("LLM_PROVIDER must be 'openrouter' or 'openai', got '{other}'"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::OpenAi => "openai",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub app_url: String,
    pub youtube_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_provider = LlmProvider::parse(
            &std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openrouter".to_string()),
        )?;

        let (llm_api_key, llm_base_url) = match llm_provider {
            LlmProvider::OpenRouter => (
                require_env("OPENROUTER_API_KEY")?,
                optional_env("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            ),
            LlmProvider::OpenAi => (
                require_env("OPENAI_API_KEY")?,
                optional_env("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm_provider,
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_api_key,
            llm_base_url: llm_base_url.trim_end_matches('/').to_string(),
            app_url: optional_env("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!(LlmProvider::parse("OpenRouter").unwrap(), LlmProvider::OpenRouter);
        assert_eq!(LlmProvider::parse(" openai ").unwrap(), LlmProvider::OpenAi);
    }

    #[test]
    fn test_provider_parse_rejects_unknown() {
        assert!(LlmProvider::parse("anthropic").is_err());
    }

    #[test]
    fn test_provider_round_trips_through_as_str() {
        for p in [LlmProvider::OpenRouter, LlmProvider::OpenAi] {
            assert_eq!(LlmProvider::parse(p.as_str()).unwrap(), p);
        }
    }
}
