use crate::engine::ast::{Expr, NativeFn};
use crate::engine::eval::LispError;
use std::io::Write;
use tracing::{instrument, trace, warn};

/// Output and predicate procedures registered in the prelude.
pub const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("display", native_display),
    ("newline", native_newline),
    ("not", native_not),
    ("number?", native_is_number),
    ("symbol?", native_is_symbol),
    ("procedure?", native_is_procedure),
];

// Space-joins the display form of each argument.
fn format_display_args(args: &[Expr]) -> String {
    args.iter()
        .map(Expr::to_display_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_stdout(text: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        warn!(error = %err, "Failed to write to stdout");
    }
}

#[instrument(level = "trace", skip(args))]
pub fn native_display(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native 'display' function");
    write_stdout(&format_display_args(&args));
    Ok(Expr::Unspecified)
}

pub fn native_newline(args: Vec<Expr>) -> Result<Expr, LispError> {
    if !args.is_empty() {
        return Err(LispError::ArityMismatch(format!(
            "newline expects 0 arguments, got {}",
            args.len()
        )));
    }
    write_stdout("\n");
    Ok(Expr::Unspecified)
}

fn expect_single<'a>(op_name: &str, args: &'a [Expr]) -> Result<&'a Expr, LispError> {
    match args {
        [only] => Ok(only),
        _ => Err(LispError::ArityMismatch(format!(
            "{} expects 1 argument, got {}",
            op_name,
            args.len()
        ))),
    }
}

pub fn native_not(args: Vec<Expr>) -> Result<Expr, LispError> {
    Ok(Expr::Bool(!expect_single("not", &args)?.is_truthy()))
}

pub fn native_is_number(args: Vec<Expr>) -> Result<Expr, LispError> {
    let value = expect_single("number?", &args)?;
    Ok(Expr::Bool(matches!(value, Expr::Int(_) | Expr::Float(_))))
}

pub fn native_is_symbol(args: Vec<Expr>) -> Result<Expr, LispError> {
    let value = expect_single("symbol?", &args)?;
    Ok(Expr::Bool(matches!(value, Expr::Symbol(_))))
}

pub fn native_is_procedure(args: Vec<Expr>) -> Result<Expr, LispError> {
    let value = expect_single("procedure?", &args)?;
    Ok(Expr::Bool(matches!(
        value,
        Expr::Function(_) | Expr::NativeFunction(_)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    #[test]
    fn test_format_display_args() {
        init_test_logging();
        let args = vec![
            Expr::Str("balance:".to_string()),
            Expr::Int(15),
            Expr::list_from(vec![Expr::Int(1), Expr::Str("x".to_string())]),
        ];
        assert_eq!(format_display_args(&args), "balance: 15 (1 \"x\")");
        assert_eq!(format_display_args(&[]), "");
    }

    #[test]
    fn test_native_display_returns_unspecified() {
        init_test_logging();
        assert_eq!(native_display(vec![]), Ok(Expr::Unspecified));
    }

    #[test]
    fn test_native_newline_arity() {
        init_test_logging();
        assert!(matches!(
            native_newline(vec![Expr::Int(1)]),
            Err(LispError::ArityMismatch(_))
        ));
    }

    #[test]
    fn test_native_not() {
        init_test_logging();
        assert_eq!(native_not(vec![Expr::Bool(false)]), Ok(Expr::Bool(true)));
        assert_eq!(native_not(vec![Expr::Nil]), Ok(Expr::Bool(true)));
        assert_eq!(native_not(vec![Expr::Int(0)]), Ok(Expr::Bool(false)));
        assert!(native_not(vec![]).is_err());
    }

    #[test]
    fn test_type_predicates() {
        init_test_logging();
        assert_eq!(native_is_number(vec![Expr::Float(1.5)]), Ok(Expr::Bool(true)));
        assert_eq!(native_is_number(vec![Expr::symbol("a")]), Ok(Expr::Bool(false)));
        assert_eq!(native_is_symbol(vec![Expr::symbol("a")]), Ok(Expr::Bool(true)));
        assert_eq!(native_is_procedure(vec![Expr::Int(1)]), Ok(Expr::Bool(false)));
    }
}
