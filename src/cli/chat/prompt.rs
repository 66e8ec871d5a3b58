use reedline::{PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode};
use std::borrow::Cow;

use crate::color;

const USER_PROMPT: &str = "[>] ";
const USER_VI_INSERT_PROMPT: &str = USER_PROMPT;
const USER_VI_NORMAL_PROMPT: &str = "[=] ";
const COMPLETION_MARKER: &str = "[/] ";
const USER_MULTILINE_PROMPT: &str = "... ";

pub(crate) fn model_prompt(model_name: &str) -> String {
    color::painted(&color::MODEL_PROMPT, &format!("[{}] ", model_name))
}

pub(crate) fn user_prompt() -> String {
    color::painted(&color::USER_PROMPT, USER_PROMPT)
}

pub(crate) fn completion_marker() -> String {
    color::painted(&color::USER_PROMPT, COMPLETION_MARKER)
}

pub(crate) struct Prompt {
    user_prompt: String,
    user_vi_normal_prompt: String,
    user_vi_insert_prompt: String,
    user_multiline_prompt: String,
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt {
            user_prompt: user_prompt(),
            user_vi_insert_prompt: color::painted(&color::USER_PROMPT, USER_VI_INSERT_PROMPT),
            user_vi_normal_prompt: color::painted(&color::USER_PROMPT, USER_VI_NORMAL_PROMPT),
            user_multiline_prompt: color::painted(&color::USER_PROMPT, USER_MULTILINE_PROMPT),
        }
    }
}

impl reedline::Prompt for Prompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<str> {
        match prompt_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => Cow::Borrowed(&self.user_prompt),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                PromptViMode::Normal => Cow::Borrowed(&self.user_vi_normal_prompt),
                PromptViMode::Insert => Cow::Borrowed(&self.user_vi_insert_prompt),
            },
            PromptEditMode::Custom(_) => unimplemented!("custom edit modes are not in use"),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed(&self.user_multiline_prompt)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
