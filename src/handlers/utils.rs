use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::survey::{
    progress_label, BUDGET_TIERS, CB_BUDGET_PREFIX, CB_CHILDREN_NO, CB_CHILDREN_YES,
    CB_CONSENT_NO, CB_CONSENT_YES, CB_INTERESTS_DONE, CB_INTEREST_PREFIX, CB_SURVEY_STOP,
    CHILDREN_OPTIONS, INTERESTS,
};

pub const MSG_FINISH_SURVEY_FIRST: &str =
    "📋 Сначала завершите опрос: ответьте на вопрос или нажмите «Остановить».";

pub const MSG_SURVEY_STOPPED: &str =
    "⏹ Опрос остановлен. Задайте вопрос в свободной форме или пройдите опрос заново: /poll";

pub const MSG_SURVEY_DONE: &str =
    "✅ Спасибо, анкета заполнена!\n\nТеперь напишите свой вопрос — я учту ваши предпочтения.";

pub const MSG_FREE_TEXT_INVITE: &str =
    "Хорошо! Просто напишите свой вопрос — я постараюсь помочь.\n\n\
     Пройти опрос позже можно командой /poll.";

/// Клавиатура согласия на анкету.
pub fn make_consent_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Да", CB_CONSENT_YES),
        InlineKeyboardButton::callback("❌ Нет", CB_CONSENT_NO),
    ]])
}

pub fn children_prompt() -> String {
    format!("{} Едут ли с вами дети?", progress_label(1))
}

pub fn make_children_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(CHILDREN_OPTIONS[0], CB_CHILDREN_YES),
            InlineKeyboardButton::callback(CHILDREN_OPTIONS[1], CB_CHILDREN_NO),
        ],
        vec![InlineKeyboardButton::callback("⏹ Остановить", CB_SURVEY_STOP)],
    ])
}

pub fn interests_prompt() -> String {
    format!(
        "{} Какие интересы вам ближе?\n\nМожно выбрать несколько и нажать «Готово».",
        progress_label(2)
    )
}

/// Клавиатура интересов; выбранные пункты помечены галочкой.
pub fn make_interests_keyboard(selected: &[String]) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for (idx, interest) in INTERESTS.iter().enumerate() {
        let marked = selected.iter().any(|s| s == interest);
        let label = if marked {
            format!("✅ {}", interest)
        } else {
            (*interest).to_string()
        };
        keyboard.push(vec![InlineKeyboardButton::callback(
            label,
            format!("{}{}", CB_INTEREST_PREFIX, idx),
        )]);
    }

    keyboard.push(vec![
        InlineKeyboardButton::callback("Готово", CB_INTERESTS_DONE),
        InlineKeyboardButton::callback("⏹ Остановить", CB_SURVEY_STOP),
    ]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn budget_prompt() -> String {
    format!("{} Какой бюджет вам ближе?", progress_label(3))
}

pub fn make_budget_keyboard() -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for (idx, tier) in BUDGET_TIERS.iter().enumerate() {
        keyboard.push(vec![InlineKeyboardButton::callback(
            (*tier).to_string(),
            format!("{}{}", CB_BUDGET_PREFIX, idx),
        )]);
    }

    keyboard.push(vec![InlineKeyboardButton::callback("⏹ Остановить", CB_SURVEY_STOP)]);

    InlineKeyboardMarkup::new(keyboard)
}
