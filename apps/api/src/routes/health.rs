use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::Config;
use crate::db::ping;
use crate::llm_client::check_health;
use crate::state::AppState;

/// GET /health
/// Liveness: the process is up and serving.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "reelscope-api"
    }))
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct EnvChecks {
    database_url: bool,
    llm_api_key: bool,
    youtube_api_key: bool,
}

impl EnvChecks {
    fn from_config(config: &Config) -> Self {
        Self {
            database_url: !config.database_url.trim().is_empty(),
            llm_api_key: !config.llm_api_key.trim().is_empty(),
            youtube_api_key: config.youtube_api_key.is_some(),
        }
    }

    /// The YouTube key only matters for fetching candidates upstream.
    fn required_ok(&self) -> bool {
        self.database_url && self.llm_api_key
    }
}

fn label(ok: bool) -> &'static str {
    if ok {
        "healthy"
    } else {
        "error"
    }
}

fn readiness_report(llm_healthy: bool, env: &EnvChecks, llm_model: &str) -> Value {
    let env_ok = env.required_ok();
    let status = if llm_healthy && env_ok {
        "healthy"
    } else {
        "unhealthy"
    };
    let llm_check = if llm_healthy {
        "responsive"
    } else {
        "unresponsive"
    };
    json!({
        "status": status,
        "database": "healthy",
        "llm": label(llm_healthy),
        "environment": label(env_ok),
        "checks": {
            "database": "connected",
            "llm": llm_check,
            "llmModel": llm_model,
            "environment": env
        },
        "timestamp": Utc::now().to_rfc3339()
    })
}

/// GET /api/health
/// Readiness: database round trip, LLM round trip and configuration.
/// A database failure short-circuits with 503 before the LLM is called.
pub async fn readiness_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(e) = ping(&state.db).await {
        warn!("Readiness check: database unreachable: {e}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "error",
                "llm": "unchecked",
                "message": "Database connection failed",
                "timestamp": Utc::now().to_rfc3339()
            })),
        );
    }

    let llm_healthy = check_health(state.llm.as_ref()).await;
    let env = EnvChecks::from_config(&state.config);

    (
        StatusCode::OK,
        Json(readiness_report(llm_healthy, &env, state.llm.model())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(youtube: bool) -> EnvChecks {
        EnvChecks {
            database_url: true,
            llm_api_key: true,
            youtube_api_key: youtube,
        }
    }

    #[test]
    fn test_healthy_without_youtube_key() {
        let report = readiness_report(true, &env(false), "gpt-4o-mini");
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["checks"]["environment"]["youtubeApiKey"], false);
    }

    #[test]
    fn test_unresponsive_llm_is_unhealthy() {
        let report = readiness_report(false, &env(true), "gpt-4o-mini");
        assert_eq!(report["status"], "unhealthy");
        assert_eq!(report["llm"], "error");
        assert_eq!(report["checks"]["llm"], "unresponsive");
    }

    #[test]
    fn test_missing_api_key_fails_environment() {
        let checks = EnvChecks {
            llm_api_key: false,
            ..env(true)
        };
        let report = readiness_report(true, &checks, "m");
        assert_eq!(report["environment"], "error");
        assert_eq!(report["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_liveness_reports_ok() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "reelscope-api");
    }
}
