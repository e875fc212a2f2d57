use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::{BotState, ConversationId};
use crate::handlers::utils::{
    children_prompt, make_children_keyboard, make_consent_keyboard, MSG_FINISH_SURVEY_FIRST,
};
use crate::models::SurveyState;
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let conversation: ConversationId = (msg.chat.id, user.id);

    match cmd {
        Command::Start => handle_start(bot, msg.chat.id, conversation, state).await?,
        Command::Clear => handle_clear(bot, msg.chat.id, conversation, state).await?,
        Command::Poll => handle_poll(bot, msg.chat.id, conversation, state).await?,
    }
    Ok(())
}

fn mid_survey(state: &BotState, conversation: ConversationId) -> bool {
    matches!(
        state.survey_state(conversation),
        SurveyState::AskingChildren | SurveyState::AskingInterests | SurveyState::AskingBudget
    )
}

/// /start всегда сбрасывает диалог и предлагает пройти анкету.
async fn handle_start(
    bot: Bot,
    chat_id: ChatId,
    conversation: ConversationId,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    state.reset(conversation);

    let greeting = "Привет! Я Lifestyle Travel Assistant 🌍\n\n\
        Помогу спланировать путешествие и отвечу на вопросы о поездках.\n\n\
        Хотите пройти короткий опрос из 3 вопросов, чтобы рекомендации были точнее?";

    bot.send_message(chat_id, greeting)
        .reply_markup(make_consent_keyboard())
        .await?;

    Ok(())
}

/// /clear вне анкеты: пустой контекст и новый токен переписки.
async fn handle_clear(
    bot: Bot,
    chat_id: ChatId,
    conversation: ConversationId,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if mid_survey(&state, conversation) {
        bot.send_message(chat_id, MSG_FINISH_SURVEY_FIRST).await?;
        return Ok(());
    }

    state.reset(conversation);
    bot.send_message(chat_id, "🗑️ Контекст очищен. Нажмите /start, чтобы начать заново.")
        .await?;

    Ok(())
}

/// /poll перезапускает анкету с первого вопроса, не трогая токен переписки.
async fn handle_poll(
    bot: Bot,
    chat_id: ChatId,
    conversation: ConversationId,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if mid_survey(&state, conversation) {
        bot.send_message(chat_id, MSG_FINISH_SURVEY_FIRST).await?;
        return Ok(());
    }

    if state.begin_survey(conversation) {
        bot.send_message(chat_id, children_prompt())
            .reply_markup(make_children_keyboard())
            .await?;
    }

    Ok(())
}
