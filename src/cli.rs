use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A small Scheme-style interpreter.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(name = "minischeme", bin_name = "minischeme")]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates an expression from a string or executes a source file.
    Run(RunArgs),
    /// Starts an interactive session.
    Repl(ReplArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Expression string to evaluate.
    #[clap(short, long, value_name = "CODE", conflicts_with = "file")]
    pub expr: Option<String>,

    /// Path to a source file to execute.
    #[clap(value_name = "FILE_PATH", conflicts_with = "expr", required_unless_present = "expr")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReplArgs {
    /// Source file evaluated before the first prompt.
    #[clap(short, long, value_name = "FILE_PATH")]
    pub load: Option<PathBuf>,

    /// Where to keep line history.
    #[clap(long, value_name = "PATH", env = "MINISCHEME_HISTORY")]
    pub history: Option<PathBuf>,
}
