use serde::{Deserialize, Serialize};

use crate::models::SurveyAnswers;

/// Тело запроса к бэкенду: вопрос пользователя, токен переписки
/// и контекст анкеты.
#[derive(Clone, Debug, Serialize)]
pub struct AssistantRequest {
    pub message: String,
    pub thread_id: String,
    pub context: SurveyAnswers,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssistantResponse {
    pub response: String,
}
