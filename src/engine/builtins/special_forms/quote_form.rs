use crate::engine::ast::Expr;
use crate::engine::eval::LispError;
use tracing::{instrument, trace};

/// `(quote datum)`: returns the datum unevaluated, with code lists turned into
/// pair chains.
#[instrument(level = "trace", skip(args))]
pub fn eval_quote(args: &[Expr]) -> Result<Expr, LispError> {
    trace!("Executing 'quote' special form");
    match args {
        [datum] => Ok(datum.to_datum()),
        _ => Err(LispError::ArityMismatch(format!(
            "'quote' expects 1 argument, got {}",
            args.len()
        ))),
    }
}
