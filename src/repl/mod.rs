pub(crate) mod highlighter;
pub(crate) mod history;

use crate::engine::ast::Expr;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, evaluate_source};
use highlighter::ReplHelper;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};

const PROMPT: &str = "minischeme> ";
const EXIT_COMMANDS: &[&str] = &["exit", ".exit", "(exit)"];

/// Text the REPL prints for one evaluated entry, if any. Errors are reported
/// separately on stderr.
pub(crate) fn render_outcome(outcome: &Result<Option<Expr>, LispError>) -> Option<String> {
    match outcome {
        Ok(Some(Expr::Unspecified)) | Ok(None) | Err(_) => None,
        Ok(Some(value)) => Some(value.to_string()),
    }
}

/// Runs the interactive loop until EOF or an exit command. Definitions made in
/// one entry stay visible to the next.
#[tracing::instrument(level = "debug", skip(env))]
pub fn start_repl(
    env: Rc<RefCell<Environment>>,
    history_override: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Starting REPL session with rustyline");
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new()?;
    rl.set_helper(Some(ReplHelper::new()));

    let history_path = history::resolve_history_path(history_override);
    match &history_path {
        Some(path) => match history::load_history(rl.history_mut(), path) {
            Ok(true) => info!("Loaded history from {}", path.display()),
            Ok(false) => info!("No history at {} yet, will create on exit", path.display()),
            Err(err) => warn!("Could not load history from {}: {}", path.display(), err),
        },
        None => warn!("Could not determine history file path. History will not be saved."),
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    warn!("Failed to add line to history: {}", err);
                }

                if EXIT_COMMANDS.contains(&trimmed_input) {
                    info!("Exiting REPL session via user command.");
                    break;
                }

                let outcome = evaluate_source(trimmed_input, Rc::clone(&env));
                if let Err(e) = &outcome {
                    eprintln!("Error: {}", e);
                }
                if let Some(text) = render_outcome(&outcome) {
                    println!("{}", text);
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("REPL interrupted (Ctrl-C).");
                println!("Interrupted. Type exit or press Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                info!("REPL EOF detected (Ctrl-D).");
                break;
            }
            Err(err) => {
                eprintln!("REPL Readline Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        if let Err(err) = history::save_history(rl.history_mut(), path) {
            warn!("Could not save history to {}: {}", path.display(), err);
        }
    }
    Ok(())
}
