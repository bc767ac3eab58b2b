use crate::engine::ast::{Expr, LispFunction};
use crate::engine::builtins::special_forms::bindable_name;
use crate::engine::env::Environment;
use crate::engine::eval::LispError;
use crate::engine::special_forms::LAMBDA;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// Builds a closure over `env` from a parameter list and body forms.
pub(crate) fn make_function(
    form: &str,
    params_expr: &Expr,
    body: &[Expr],
    env: Rc<RefCell<Environment>>,
) -> Result<Expr, LispError> {
    let Expr::List(params_list) = params_expr else {
        return Err(LispError::TypeError {
            expected: "List of parameters".to_string(),
            found: format!("{:?}", params_expr),
        });
    };
    if body.is_empty() {
        return Err(LispError::ArityMismatch(format!(
            "'{}' expects at least one body expression",
            form
        )));
    }

    let param_names = params_list
        .iter()
        .map(|param| bindable_name(param, form))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(parameters = ?param_names, "Creating function");
    Ok(Expr::Function(LispFunction {
        params: param_names,
        body: body.to_vec(),
        closure: env,
    }))
}

#[instrument(level = "trace", skip(args, env))]
pub fn eval_lambda(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'lambda' special form");
    let Some((params_expr, body)) = args.split_first() else {
        return Err(LispError::ArityMismatch(
            "'lambda' expects a parameter list and a body, got 0 arguments".to_string(),
        ));
    };
    make_function(LAMBDA, params_expr, body, env)
}
