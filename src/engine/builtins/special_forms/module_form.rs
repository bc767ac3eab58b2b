use crate::engine::ast::Expr;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument};

/// `(module form...)`: evaluates each form in the current environment, so its
/// definitions stay visible afterwards. Always yields nil.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_module(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    for form in args {
        eval(form, Rc::clone(&env))?;
    }
    debug!(forms = args.len(), "Evaluated module body");
    Ok(Expr::Nil)
}
