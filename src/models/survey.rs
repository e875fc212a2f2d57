//! Каталог анкеты: варианты ответов и значения callback-кнопок.

pub const QUESTION_COUNT: usize = 3;

pub const CHILDREN_OPTIONS: &[&str] = &["Да", "Нет"];

pub const INTERESTS: &[&str] = &[
    "Музеи",
    "Гастрономия",
    "Природа",
    "Шопинг",
    "Ночная жизнь",
    "Архитектура",
];

pub const BUDGET_TIERS: &[&str] = &["Без затрат", "Эконом", "Средний", "Комфорт", "Люкс"];

pub const CB_CONSENT_YES: &str = "consent_yes";
pub const CB_CONSENT_NO: &str = "consent_no";
pub const CB_CHILDREN_YES: &str = "children_yes";
pub const CB_CHILDREN_NO: &str = "children_no";
pub const CB_INTEREST_PREFIX: &str = "interest_";
pub const CB_INTERESTS_DONE: &str = "interests_done";
pub const CB_BUDGET_PREFIX: &str = "budget_";
pub const CB_SURVEY_STOP: &str = "survey_stop";

/// Метка прогресса вида "[1/3]"; пересчитывается от размера анкеты.
pub fn progress_label(step: usize) -> String {
    format!("[{}/{}]", step, QUESTION_COUNT)
}

/// Вариант ответа по значению кнопки "prefix_N". Значение вне каталога
/// (устаревшая кнопка) даёт None.
pub fn option_by_callback<'a>(data: &str, prefix: &str, options: &'a [&'a str]) -> Option<&'a str> {
    data.strip_prefix(prefix)?
        .parse::<usize>()
        .ok()
        .and_then(|idx| options.get(idx).copied())
}
