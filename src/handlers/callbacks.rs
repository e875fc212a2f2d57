use teloxide::prelude::*;
use teloxide::types::MessageId;
use std::error::Error;

use crate::bot_state::{BotState, ConversationId};
use crate::handlers::utils::{
    budget_prompt, children_prompt, interests_prompt, make_budget_keyboard,
    make_children_keyboard, make_interests_keyboard, MSG_FREE_TEXT_INVITE, MSG_SURVEY_DONE,
    MSG_SURVEY_STOPPED,
};
use crate::models::survey::{
    option_by_callback, BUDGET_TIERS, CB_BUDGET_PREFIX, CB_CHILDREN_NO, CB_CHILDREN_YES,
    CB_CONSENT_NO, CB_CONSENT_YES, CB_INTERESTS_DONE, CB_INTEREST_PREFIX, CB_SURVEY_STOP,
    CHILDREN_OPTIONS, INTERESTS,
};
use crate::models::SurveyState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Telegram ждёт подтверждения нажатия, даже если кнопка устарела
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(ref message) = q.message else {
        return Ok(());
    };

    let chat_id = message.chat().id;
    let message_id = message.id();
    let conversation: ConversationId = (chat_id, q.from.id);

    match state.survey_state(conversation) {
        SurveyState::Idle => match data {
            CB_CONSENT_YES => {
                if state.begin_survey(conversation) {
                    bot.edit_message_text(chat_id, message_id, children_prompt())
                        .reply_markup(make_children_keyboard())
                        .await?;
                }
            }
            CB_CONSENT_NO => {
                if state.decline_survey(conversation) {
                    bot.edit_message_text(chat_id, message_id, MSG_FREE_TEXT_INVITE)
                        .await?;
                }
            }
            _ => {}
        },

        SurveyState::AskingChildren => match data {
            CB_CHILDREN_YES | CB_CHILDREN_NO => {
                let answer = if data == CB_CHILDREN_YES {
                    CHILDREN_OPTIONS[0]
                } else {
                    CHILDREN_OPTIONS[1]
                };
                if state.record_children(conversation, answer) {
                    bot.edit_message_text(chat_id, message_id, interests_prompt())
                        .reply_markup(make_interests_keyboard(&[]))
                        .await?;
                }
            }
            CB_SURVEY_STOP => stop_survey(&bot, chat_id, message_id, conversation, &state).await?,
            _ => {}
        },

        SurveyState::AskingInterests => match data {
            CB_INTERESTS_DONE => {
                if state.commit_interests(conversation) {
                    bot.edit_message_text(chat_id, message_id, budget_prompt())
                        .reply_markup(make_budget_keyboard())
                        .await?;
                }
            }
            CB_SURVEY_STOP => stop_survey(&bot, chat_id, message_id, conversation, &state).await?,
            _ => {
                if let Some(interest) = option_by_callback(data, CB_INTEREST_PREFIX, INTERESTS) {
                    if state.toggle_interest(conversation, interest) {
                        // Тот же вопрос, обновлённая разметка — без нового сообщения
                        let selected = state.pending_interests(conversation);
                        bot.edit_message_reply_markup(chat_id, message_id)
                            .reply_markup(make_interests_keyboard(&selected))
                            .await?;
                    }
                }
            }
        },

        SurveyState::AskingBudget => match data {
            CB_SURVEY_STOP => stop_survey(&bot, chat_id, message_id, conversation, &state).await?,
            _ => {
                if let Some(tier) = option_by_callback(data, CB_BUDGET_PREFIX, BUDGET_TIERS) {
                    if state.record_budget(conversation, tier) {
                        bot.edit_message_text(chat_id, message_id, MSG_SURVEY_DONE)
                            .await?;
                    }
                }
            }
        },

        // Кнопки от прежних сообщений: подтверждены и проигнорированы
        SurveyState::AwaitingFreeText => {}
    }

    Ok(())
}

async fn stop_survey(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    conversation: ConversationId,
    state: &BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if state.stop_survey(conversation) {
        bot.edit_message_text(chat_id, message_id, MSG_SURVEY_STOPPED)
            .await?;
    }
    Ok(())
}
