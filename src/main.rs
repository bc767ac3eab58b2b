mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, ReplArgs, RunArgs};
use minischeme::logging::init_logging;
use minischeme::{Environment, Expr, evaluate_source, repl};
use std::fs;
use std::rc::Rc;
use tracing::{debug, info};

fn run(args: RunArgs) -> Result<()> {
    let (source, origin) = match (args.expr, args.file) {
        (Some(expr), _) => (expr, "<expr>".to_string()),
        (None, Some(path)) => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read source file {}", path.display()))?;
            (source, path.display().to_string())
        }
        (None, None) => bail!("Nothing to run: pass a file or --expr"),
    };
    info!(origin = %origin, "Evaluating source");

    let env = Environment::new_with_prelude();
    match evaluate_source(&source, env).with_context(|| format!("Error in {}", origin))? {
        Some(Expr::Unspecified) | None => debug!("No value to print"),
        Some(value) => println!("{}", value),
    }
    Ok(())
}

fn start_repl(args: ReplArgs) -> Result<()> {
    let env = Environment::new_with_prelude();
    if let Some(path) = args.load {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read source file {}", path.display()))?;
        evaluate_source(&source, Rc::clone(&env))
            .with_context(|| format!("Error in {}", path.display()))?;
        info!(path = %path.display(), "Preloaded source file");
    }
    repl::start_repl(env, args.history)
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    debug!(?cli, "Parsed CLI arguments");

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Repl(args) => start_repl(args),
    }
}
