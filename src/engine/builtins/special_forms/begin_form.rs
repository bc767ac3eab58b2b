use crate::engine::ast::Expr;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval_body};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{instrument, trace};

/// `(begin expr...)`: evaluates the forms in a fresh frame and returns the last
/// value, or nil when there are none.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_begin(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'begin' special form");
    eval_body(args, Environment::new_enclosed(env))
}
