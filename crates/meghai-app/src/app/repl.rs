use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{Cmd, DefaultEditor, EventHandler, KeyCode, KeyEvent, Modifiers};

use meghai_api::GeminiClient;
use meghai_core::input::{self, InputAction, KeyPress};
use meghai_core::{ConversationSession, ConversationState, SubmitOutcome};

use crate::cli::Cli;
use crate::logging::ConversationLogger;

/// Run the terminal presentation: one conversation session, one prompt
/// loop. Enter submits; Shift+Enter inserts a newline into the draft.
pub async fn run_repl_mode(cli: &Cli, client: GeminiClient) -> Result<()> {
    println!("{}", "🤖 MeghAI - how can I assist you today?".bright_cyan().bold());
    println!("{}", format!("Model: {}", cli.model).bright_black());
    println!(
        "{}",
        "Type 'exit' or 'quit' to leave, '/history' to re-print the transcript\n".bright_black()
    );

    let mut session = ConversationSession::new(client);

    let mut logger = if cli.no_log {
        None
    } else {
        match ConversationLogger::new(&std::env::current_dir()?, &cli.model).await {
            Ok(l) => {
                println!("{}", format!("Logging to {}", l.path().display()).bright_black());
                Some(l)
            }
            Err(e) => {
                eprintln!("Logging disabled: {}", e);
                None
            }
        }
    };

    let mut rl = DefaultEditor::new()?;
    bind_submit_keys(&mut rl);

    loop {
        if let Some(error) = session.state().last_error() {
            eprintln!(
                "{} {} {}",
                "⚠️".yellow(),
                error,
                "(type /dismiss to hide this notice)".bright_black()
            );
        }

        // A failed submit keeps the draft; pre-fill the prompt with it so
        // the user can retry or edit.
        let prompt = format!("{} ", "You:".bright_green().bold());
        let draft = session.state().draft().to_string();
        let readline = if draft.is_empty() {
            rl.readline(&prompt)
        } else {
            rl.readline_with_initial(&prompt, (&draft, ""))
        };

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();

                if line.is_empty() {
                    continue;
                }

                if line == "exit" || line == "quit" {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }

                if line == "/history" {
                    print_history(session.state());
                    continue;
                }

                if line == "/dismiss" {
                    session.dismiss_error();
                    continue;
                }

                // Sign-in affordance with no behavior behind it.
                if line == "/login" {
                    println!("{}", "Sign-in is not available in this build.".bright_black());
                    continue;
                }

                rl.add_history_entry(&line)?;

                session.set_draft(line);
                println!("{}", "● ● ●  thinking…".bright_black());

                match session.submit().await {
                    SubmitOutcome::Answered(exchange) => {
                        println!("\n{} {}\n", "AI:".bright_blue().bold(), exchange.answer);
                        if let Some(logger) = &mut logger {
                            logger.log_exchange(&exchange.question, &exchange.answer).await;
                        }
                    }
                    SubmitOutcome::Rejected => continue,
                    SubmitOutcome::Failed(message) => {
                        eprintln!("{} {}", "Error:".bright_red().bold(), message);
                        if cli.verbose {
                            eprintln!("{}", format!("endpoint: {}", session_endpoint(&session)).bright_black());
                        }
                        println!(
                            "{}",
                            "Your question was kept - press Enter to retry or edit it.\n".bright_black()
                        );
                        if let Some(logger) = &mut logger {
                            logger.log_failure(session.state().draft(), &message).await;
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".bright_red().bold(), err);
                break;
            }
        }
    }

    if let Some(logger) = &mut logger {
        logger.shutdown().await;
    }

    Ok(())
}

fn session_endpoint(session: &ConversationSession<GeminiClient>) -> String {
    session.provider().endpoint().to_string()
}

/// Map the core key contract onto rustyline. Plain Enter accepts the
/// line (a submit); Shift+Enter inserts a literal newline for multi-line
/// drafts.
fn bind_submit_keys(rl: &mut DefaultEditor) {
    for shift in [false, true] {
        let modifiers = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
        let cmd = match input::action_for(KeyPress::enter(shift)) {
            InputAction::Submit => Cmd::AcceptLine,
            InputAction::InsertNewline => Cmd::Newline,
            InputAction::Passthrough => continue,
        };
        rl.bind_sequence(KeyEvent(KeyCode::Enter, modifiers), EventHandler::Simple(cmd));
    }
}

fn print_history(state: &ConversationState) {
    if state.history().is_empty() {
        println!("{}", "No conversations yet.".bright_black());
        return;
    }
    for exchange in state.history() {
        println!("{} {}", "You:".bright_green().bold(), exchange.question);
        println!("{} {}\n", "AI:".bright_blue().bold(), exchange.answer);
    }
}
