use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Этап диалога с пользователем.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    Idle,
    AskingChildren,
    AskingInterests,
    AskingBudget,
    AwaitingFreeText,
}

/// Собранные ответы анкеты. Уходят в бэкенд как контекст запроса.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub children: Option<String>,
    pub interests: Vec<String>,
    pub budget: Option<String>,
}

/// Состояние одного диалога: этап анкеты, собранные ответы, токен
/// переписки с бэкендом и флаг незавершённого запроса.
#[derive(Debug, Clone)]
pub struct Session {
    pub survey_state: SurveyState,
    pub answers: SurveyAnswers,
    /// Промежуточный выбор интересов; живёт только внутри AskingInterests.
    pub pending_interests: Vec<String>,
    pub thread_id: String,
    pub in_flight: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            survey_state: SurveyState::Idle,
            answers: SurveyAnswers::default(),
            pending_interests: Vec::new(),
            thread_id: Uuid::new_v4().to_string(),
            in_flight: false,
        }
    }

    /// Запуск анкеты: из Idle (согласие) или из AwaitingFreeText (/poll).
    /// Прежние ответы перезаписываются, токен переписки сохраняется.
    pub fn begin_survey(&mut self) -> bool {
        match self.survey_state {
            SurveyState::Idle | SurveyState::AwaitingFreeText => {
                self.answers = SurveyAnswers::default();
                self.pending_interests.clear();
                self.survey_state = SurveyState::AskingChildren;
                true
            }
            _ => false,
        }
    }

    /// Отказ от анкеты на этапе согласия.
    pub fn decline_survey(&mut self) -> bool {
        if self.survey_state == SurveyState::Idle {
            self.survey_state = SurveyState::AwaitingFreeText;
            true
        } else {
            false
        }
    }

    pub fn record_children(&mut self, answer: &str) -> bool {
        if self.survey_state != SurveyState::AskingChildren {
            return false;
        }
        self.answers.children = Some(answer.to_string());
        self.survey_state = SurveyState::AskingInterests;
        true
    }

    /// Переключение интереса: повторный выбор убирает его из списка.
    pub fn toggle_interest(&mut self, interest: &str) -> bool {
        if self.survey_state != SurveyState::AskingInterests {
            return false;
        }
        if let Some(pos) = self.pending_interests.iter().position(|i| i == interest) {
            self.pending_interests.remove(pos);
        } else {
            self.pending_interests.push(interest.to_string());
        }
        true
    }

    pub fn commit_interests(&mut self) -> bool {
        if self.survey_state != SurveyState::AskingInterests {
            return false;
        }
        self.answers.interests = std::mem::take(&mut self.pending_interests);
        self.survey_state = SurveyState::AskingBudget;
        true
    }

    pub fn record_budget(&mut self, tier: &str) -> bool {
        if self.survey_state != SurveyState::AskingBudget {
            return false;
        }
        self.answers.budget = Some(tier.to_string());
        self.survey_state = SurveyState::AwaitingFreeText;
        true
    }

    /// Досрочный выход из анкеты; незафиксированный выбор отбрасывается.
    pub fn stop_survey(&mut self) -> bool {
        match self.survey_state {
            SurveyState::AskingChildren
            | SurveyState::AskingInterests
            | SurveyState::AskingBudget => {
                self.pending_interests.clear();
                self.survey_state = SurveyState::AwaitingFreeText;
                true
            }
            _ => false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_survey_path_reaches_free_text() {
        let mut s = Session::new();
        assert!(s.begin_survey());
        assert!(s.record_children("Нет"));
        assert!(s.toggle_interest("Музеи"));
        assert!(s.toggle_interest("Гастрономия"));
        assert!(s.commit_interests());
        assert!(s.record_budget("Без затрат"));

        assert_eq!(s.survey_state, SurveyState::AwaitingFreeText);
        assert_eq!(s.answers.children.as_deref(), Some("Нет"));
        assert_eq!(s.answers.interests, vec!["Музеи", "Гастрономия"]);
        assert_eq!(s.answers.budget.as_deref(), Some("Без затрат"));
        assert!(s.pending_interests.is_empty());
    }

    #[test]
    fn toggle_twice_removes_interest() {
        let mut s = Session::new();
        s.begin_survey();
        s.record_children("Да");
        s.toggle_interest("Шопинг");
        s.toggle_interest("Природа");
        s.toggle_interest("Шопинг");
        assert_eq!(s.pending_interests, vec!["Природа"]);
    }

    #[test]
    fn stop_keeps_only_earlier_answers() {
        let mut s = Session::new();
        s.begin_survey();
        s.record_children("Да");
        s.toggle_interest("Природа");
        assert!(s.stop_survey());

        assert_eq!(s.survey_state, SurveyState::AwaitingFreeText);
        assert_eq!(s.answers.children.as_deref(), Some("Да"));
        assert!(s.answers.interests.is_empty());
        assert!(s.answers.budget.is_none());
        assert!(s.pending_interests.is_empty());
    }

    #[test]
    fn stop_works_from_every_question() {
        let mut first = Session::new();
        first.begin_survey();
        assert!(first.stop_survey());
        assert_eq!(first.survey_state, SurveyState::AwaitingFreeText);

        let mut second = Session::new();
        second.begin_survey();
        second.record_children("Нет");
        assert!(second.stop_survey());
        assert_eq!(second.survey_state, SurveyState::AwaitingFreeText);

        let mut third = Session::new();
        third.begin_survey();
        third.record_children("Нет");
        third.commit_interests();
        assert!(third.stop_survey());
        assert_eq!(third.survey_state, SurveyState::AwaitingFreeText);
    }

    #[test]
    fn wrong_state_inputs_are_noops() {
        let mut s = Session::new();
        assert!(!s.record_children("Да"));
        assert!(!s.toggle_interest("Музеи"));
        assert!(!s.commit_interests());
        assert!(!s.record_budget("Эконом"));
        assert!(!s.stop_survey());
        assert_eq!(s.survey_state, SurveyState::Idle);
        assert!(s.answers.children.is_none());
    }

    #[test]
    fn decline_goes_straight_to_free_text() {
        let mut s = Session::new();
        assert!(s.decline_survey());
        assert_eq!(s.survey_state, SurveyState::AwaitingFreeText);
        assert!(!s.decline_survey());
    }

    #[test]
    fn restart_overwrites_answers_and_keeps_thread() {
        let mut s = Session::new();
        s.begin_survey();
        s.record_children("Да");
        s.toggle_interest("Музеи");
        s.commit_interests();
        s.record_budget("Люкс");
        let thread = s.thread_id.clone();

        assert!(s.begin_survey());
        assert_eq!(s.survey_state, SurveyState::AskingChildren);
        assert!(s.answers.children.is_none());
        assert!(s.answers.interests.is_empty());
        assert!(s.answers.budget.is_none());
        assert_eq!(s.thread_id, thread);
    }
}
