use crate::engine::ast::Expr;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(if test consequent [alternative])`. Only the chosen branch is evaluated;
/// a false test without an alternative yields nil.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_if(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    let (test, consequent, alternative) = match args {
        [test, consequent] => (test, consequent, None),
        [test, consequent, alternative] => (test, consequent, Some(alternative)),
        _ => {
            return Err(LispError::ArityMismatch(format!(
                "'if' expects 2 or 3 arguments, got {}",
                args.len()
            )));
        }
    };

    let outcome = eval(test, Rc::clone(&env))?;
    debug!(test = %outcome, "Evaluated 'if' test");

    match (outcome.is_truthy(), alternative) {
        (true, _) => eval(consequent, env),
        (false, Some(alternative)) => eval(alternative, env),
        (false, None) => {
            trace!("No alternative branch, yielding nil");
            Ok(Expr::Nil)
        }
    }
}
