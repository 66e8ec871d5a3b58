mod highlighter;
mod prompt;
mod repl;

use std::io::{self, IsTerminal, Read};

use tokio::{select, signal};

use self::prompt::model_prompt;
use self::repl::{Input, Repl};
use crate::cli::backend_api;
use crate::config::Config;
use crate::ollama::ErrorKind;
use crate::probe::{self, wait_for_backend};
use crate::session::{ChatSession, Reply, Submission};
use crate::ChatArgs;
use crate::{config, die, error, version, warn};

pub(crate) async fn chat_cmd(config: &Config, args: &ChatArgs) {
    let api = backend_api(config);

    // Fail fast: nothing is served while the backend is unreachable.
    if !wait_for_backend(&api, probe::PROBE_ATTEMPTS, probe::PROBE_DELAY).await {
        die!(
            "could not reach the inference backend after {} attempts",
            probe::PROBE_ATTEMPTS
        );
    }

    let model = match args.model.clone().or_else(|| config.default_model.clone()) {
        Some(model) => model,
        None => die!("no model specified; pass --model or set default_model in the config"),
    };

    let in_terminal = io::stdin().is_terminal();
    let out_terminal = io::stdout().is_terminal();

    // If standard input is not a terminal, gather the initial prompt from it
    // with the assumption that we are not running interactively.
    let interactive = if args.prompt.is_some() {
        args.interactive
    } else {
        in_terminal && out_terminal
    };

    if args.prompt.is_some() && !in_terminal {
        die!("an initial prompt was provided both on standard input and as an argument");
    }

    let initial_prompt = if let Some(prompt) = &args.prompt {
        Some(prompt.clone())
    } else if !in_terminal {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("failed to read the initial prompt from standard input");
        Some(buf)
    } else {
        None
    };

    let mut session = ChatSession::with_backend(api);

    run(&mut session, config.keybindings, model, initial_prompt, interactive).await;
}

async fn run(
    session: &mut ChatSession,
    keybindings: config::Keybindings,
    mut model: String,
    initial_prompt: Option<String>,
    interactive: bool,
) {
    if interactive {
        println!("{} version {}", version::NAME, version::VERSION);
        println!("{}", crate::chat::GREETING);
    }

    let mut repl = if interactive {
        Some(Repl::new(keybindings))
    } else {
        None
    };

    let mut pending = initial_prompt;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => {
                if !interactive {
                    break;
                }

                match repl.as_mut().unwrap().read() {
                    Input::Line(line) => line,
                    Input::Clear => {
                        session.clear();
                        continue;
                    }
                    Input::SwitchModel(new_model) => {
                        model = new_model;
                        continue;
                    }
                    Input::Exit => break,
                }
            }
        };

        exchange(session, &line, &model, interactive).await;

        if !interactive {
            break;
        }
    }
}

/// Drives one exchange to completion, stopping the in-flight generation
/// if the user interrupts with Ctrl-C.
async fn exchange(session: &mut ChatSession, line: &str, model: &str, interactive: bool) {
    let submission = drive(session, line, model).await;

    let reply = match submission.reply {
        Some(reply) => reply,
        None => return, // empty input, nothing ran
    };

    match reply {
        Reply::Answer(text) => {
            if interactive {
                println!("{}{}\n", model_prompt(model), text);
            } else {
                print!("{}", text);
            }
        }
        Reply::Failed(err) if err.kind() == ErrorKind::NotFound => {
            error!("model \"{}\" is not available on the backend", model);
        }
        other => {
            warn!("{}", other.display_text());
        }
    }
}

async fn drive(session: &mut ChatSession, line: &str, model: &str) -> Submission {
    let stop = session.start_exchange();

    let fut = session.submit_with(line, model, stop.token());
    tokio::pin!(fut);

    loop {
        select! {
            submission = &mut fut => break submission,
            _ = signal::ctrl_c() => stop.stop(),
        }
    }
}
