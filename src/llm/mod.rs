pub mod config;

use std::env;
use std::time::Duration;

use reqwest::Client;

use crate::llm::config::{AssistantRequest, AssistantResponse};
use crate::models::SurveyAnswers;

const BACKEND_URL_ENV: &str = "ASSISTANT_API_URL";
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const TIMEOUT_ENV: &str = "ASSISTANT_API_TIMEOUT_SECS";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Ошибки обращения к бэкенду. Пользователь видит только фиксированные
/// тексты, детали остаются в логах.
#[derive(Debug)]
pub enum RelayError {
    Timeout,
    Status(u16),
    Transport(String),
    Malformed(String),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Timeout => write!(f, "backend request timed out"),
            RelayError::Status(code) => write!(f, "backend returned status {}", code),
            RelayError::Transport(e) => write!(f, "transport error: {}", e),
            RelayError::Malformed(e) => write!(f, "malformed backend response: {}", e),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Malformed(err.to_string())
    }
}

fn backend_url() -> String {
    env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
}

fn request_timeout() -> Duration {
    let secs = env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Один запрос к бэкенду на один вопрос пользователя. Без повторов:
/// неудачная попытка сразу возвращается наверх.
pub async fn chat(
    message: String,
    thread_id: String,
    context: SurveyAnswers,
) -> Result<String, RelayError> {
    let request = AssistantRequest {
        message,
        thread_id,
        context,
    };

    let client = Client::builder().timeout(request_timeout()).build()?;

    let response = client
        .post(format!("{}/chat", backend_url()))
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&request)?)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Status(status.as_u16()));
    }

    let text = response.text().await?;
    let response = serde_json::from_str::<AssistantResponse>(&text)?;

    Ok(response.response)
}
