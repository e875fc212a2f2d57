use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use teloxide::types::{ChatId, UserId};

use crate::models::{Session, SurveyState};

/// Ключ диалога: пара (чат, пользователь).
pub type ConversationId = (ChatId, UserId);

type SessionMap = Arc<Mutex<HashMap<ConversationId, Session>>>;

/// Общее состояние бота: сессии всех диалогов в памяти процесса.
///
/// Все операции синхронные и O(1); блокировка никогда не удерживается
/// через точку ожидания.
#[derive(Clone, Default)]
pub struct BotState {
    sessions: SessionMap,
}

impl BotState {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn with_session<T>(&self, id: ConversationId, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(id).or_insert_with(Session::new))
    }

    /// Снимок сессии; для нового диалога создаётся пустая.
    pub fn get_or_create(&self, id: ConversationId) -> Session {
        self.with_session(id, |s| s.clone())
    }

    /// Полный сброс: пустые ответы, новый токен переписки, снятый флаг.
    pub fn reset(&self, id: ConversationId) {
        self.with_session(id, |s| *s = Session::new());
    }

    /// Выставляет флаг незавершённого запроса и возвращает прежнее значение.
    pub fn set_in_flight(&self, id: ConversationId, value: bool) -> bool {
        self.with_session(id, |s| std::mem::replace(&mut s.in_flight, value))
    }

    pub fn survey_state(&self, id: ConversationId) -> SurveyState {
        self.with_session(id, |s| s.survey_state)
    }

    pub fn begin_survey(&self, id: ConversationId) -> bool {
        self.with_session(id, |s| s.begin_survey())
    }

    pub fn decline_survey(&self, id: ConversationId) -> bool {
        self.with_session(id, |s| s.decline_survey())
    }

    pub fn record_children(&self, id: ConversationId, answer: &str) -> bool {
        self.with_session(id, |s| s.record_children(answer))
    }

    pub fn toggle_interest(&self, id: ConversationId, interest: &str) -> bool {
        self.with_session(id, |s| s.toggle_interest(interest))
    }

    pub fn pending_interests(&self, id: ConversationId) -> Vec<String> {
        self.with_session(id, |s| s.pending_interests.clone())
    }

    pub fn commit_interests(&self, id: ConversationId) -> bool {
        self.with_session(id, |s| s.commit_interests())
    }

    pub fn record_budget(&self, id: ConversationId, tier: &str) -> bool {
        self.with_session(id, |s| s.record_budget(tier))
    }

    pub fn stop_survey(&self, id: ConversationId) -> bool {
        self.with_session(id, |s| s.stop_survey())
    }
}

/// Снимает флаг незавершённого запроса при любом выходе из обработчика.
pub struct InFlightGuard {
    state: BotState,
    id: ConversationId,
}

impl InFlightGuard {
    pub fn new(state: BotState, id: ConversationId) -> Self {
        Self { state, id }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.set_in_flight(self.id, false);
    }
}
