use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultCompleter, EditCommand, EditMode, Emacs, KeyCode, KeyModifiers,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal, Vi,
};

use super::highlighter::InputHighlighter;
use super::prompt::{completion_marker, Prompt};
use crate::config;
use crate::warn;

/// One unit of user intent read from the prompt.
pub(crate) enum Input {
    /// A line to submit as a chat message
    Line(String),
    /// Reset the conversation to its seed state
    Clear,
    /// Target a different model for subsequent requests
    SwitchModel(String),
    /// Leave the chat
    Exit,
}

fn edit_mode(keybindings: config::Keybindings) -> Box<dyn EditMode> {
    match keybindings {
        config::Keybindings::Vi => {
            let mut insert_bindings = default_vi_insert_keybindings();

            insert_bindings.add_binding(
                KeyModifiers::NONE,
                KeyCode::Tab,
                ReedlineEvent::UntilFound(vec![
                    ReedlineEvent::Menu("completion_menu".to_string()),
                    ReedlineEvent::MenuNext,
                ]),
            );

            Box::new(Vi::new(insert_bindings, default_vi_normal_keybindings()))
        }
        config::Keybindings::Emacs => {
            let mut keybindings = default_emacs_keybindings();

            keybindings.add_binding(
                KeyModifiers::NONE,
                KeyCode::Tab,
                ReedlineEvent::UntilFound(vec![
                    ReedlineEvent::Menu("completion_menu".to_string()),
                    ReedlineEvent::MenuNext,
                ]),
            );

            keybindings.add_binding(
                KeyModifiers::CONTROL,
                KeyCode::Char('j'),
                ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
            );

            Box::new(Emacs::new(keybindings))
        }
    }
}

pub(crate) struct Repl {
    line_editor: Reedline,
    prompt: Prompt,
}

impl Repl {
    pub(crate) fn new(keybindings: config::Keybindings) -> Repl {
        let prompt = Prompt::default();

        let commands = vec!["/exit".into(), "/clear".into(), "/model".into()];

        let mut completer = Box::new(DefaultCompleter::with_inclusions(&['/']));

        completer.insert(commands);

        // Use the interactive menu to select options from the completer
        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name("completion_menu")
                .with_marker(&completion_marker())
                .with_text_style(Style::new().fg(Color::Default))
                .with_selected_text_style(Style::new().fg(Color::Blue).on(Color::DarkGray))
                .with_selected_match_text_style(
                    Style::new().fg(Color::Blue).bold().on(Color::DarkGray),
                ),
        );

        let line_editor = Reedline::create()
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode(keybindings))
            .with_highlighter(Box::new(InputHighlighter::default()));

        Repl {
            line_editor,
            prompt,
        }
    }

    /// Reads until the user produces something actionable. Ctrl-C at the
    /// prompt discards the line being composed; Ctrl-D leaves the chat.
    pub(crate) fn read(&mut self) -> Input {
        loop {
            let sig = self.line_editor.read_line(&self.prompt);

            match sig {
                Ok(Signal::Success(line)) => {
                    if !line.starts_with('/') {
                        return Input::Line(line);
                    }

                    match line.trim_end() {
                        "/exit" => return Input::Exit,
                        "/clear" => return Input::Clear,
                        command => {
                            if let Some(model) = command.strip_prefix("/model ") {
                                return Input::SwitchModel(model.trim().to_string());
                            }

                            warn!("unknown command \"{}\"", command);
                            continue;
                        }
                    }
                }
                Ok(Signal::CtrlD) => return Input::Exit,
                Ok(Signal::CtrlC) => continue,
                Err(_) => return Input::Exit,
            }
        }
    }
}
