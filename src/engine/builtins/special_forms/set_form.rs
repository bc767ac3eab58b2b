use crate::engine::ast::Expr;
use crate::engine::builtins::special_forms::bindable_name;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval};
use crate::engine::special_forms::SET;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(set! name expr)`: assigns to the nearest existing binding of `name`.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_set(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'set!' special form");
    let [target, value_expr] = args else {
        return Err(LispError::ArityMismatch(format!(
            "'set!' expects 2 arguments, got {}",
            args.len()
        )));
    };

    let name = bindable_name(target, SET)?;
    let value = main_eval(value_expr, Rc::clone(&env))?;
    debug!(variable_name = %name, value = %value, "Assigning variable");
    env.borrow_mut().set(&name, value)?;
    Ok(Expr::Unspecified)
}
