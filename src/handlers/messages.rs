use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use std::error::Error;

use crate::bot_state::{BotState, ConversationId, InFlightGuard};
use crate::llm::{self, RelayError};
use crate::models::SurveyState;
use crate::sanitize::sanitize;

const MSG_STILL_THINKING: &str = "⏳ Я ещё думаю над предыдущим вопросом, подождите немного.";
const MSG_TIMEOUT: &str = "⏰ Сервис не успел ответить. Попробуйте ещё раз.";
const MSG_FAILURE: &str = "⚠️ Что-то пошло не так. Пожалуйста, попробуйте ещё раз.";
const MSG_USE_BUTTONS: &str =
    "Пожалуйста, ответьте на вопрос кнопками выше или нажмите «Остановить».";
const MSG_PRESS_START: &str = "Нажмите /start, чтобы начать работу с ботом.";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let conversation: ConversationId = (msg.chat.id, user.id);

    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Напишите свой вопрос текстом 🙂")
            .await?;
        return Ok(());
    };

    // Команды уже обработаны в command_handler
    if text.starts_with('/') {
        return Ok(());
    }

    match state.survey_state(conversation) {
        SurveyState::AwaitingFreeText => {
            relay_question(bot, msg.chat.id, conversation, text, state).await?;
        }
        SurveyState::Idle => {
            bot.send_message(msg.chat.id, MSG_PRESS_START).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, MSG_USE_BUTTONS).await?;
        }
    }

    Ok(())
}

/// Пересылка вопроса в бэкенд: не больше одного запроса на диалог
/// одновременно, повторное сообщение получает просьбу подождать.
async fn relay_question(
    bot: Bot,
    chat_id: ChatId,
    conversation: ConversationId,
    text: &str,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Флаг выставляется до первой точки ожидания
    if state.set_in_flight(conversation, true) {
        bot.send_message(chat_id, MSG_STILL_THINKING).await?;
        return Ok(());
    }
    let _guard = InFlightGuard::new(state.clone(), conversation);

    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;

    let session = state.get_or_create(conversation);

    match llm::chat(text.to_string(), session.thread_id, session.answers).await {
        Ok(answer) => {
            bot.send_message(chat_id, sanitize(&answer))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Err(RelayError::Timeout) => {
            log::warn!("Backend timeout for chat {}", chat_id);
            bot.send_message(chat_id, MSG_TIMEOUT).await?;
        }
        Err(e) => {
            log::error!("Backend request failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, MSG_FAILURE).await?;
        }
    }

    Ok(())
}
