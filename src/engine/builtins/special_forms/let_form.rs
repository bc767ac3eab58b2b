use crate::engine::ast::Expr;
use crate::engine::builtins::special_forms::bindable_name;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval, eval_body};
use crate::engine::special_forms::LET;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(let ((name expr)...) body...)`. Bindings are evaluated in order inside the
/// new frame, so each one can see the bindings before it.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_let(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'let' special form");
    let Some((bindings_expr, body)) = args.split_first() else {
        return Err(LispError::ArityMismatch(
            "'let' expects a binding list and a body, got 0 arguments".to_string(),
        ));
    };
    if body.is_empty() {
        return Err(LispError::ArityMismatch(
            "'let' expects at least one body expression".to_string(),
        ));
    }
    let Expr::List(bindings) = bindings_expr else {
        return Err(LispError::TypeError {
            expected: "List of bindings".to_string(),
            found: format!("{:?}", bindings_expr),
        });
    };

    let let_env = Environment::new_enclosed(Rc::clone(&env));
    for binding in bindings {
        let Expr::List(pair) = binding else {
            return Err(LispError::InvalidArguments {
                operator: LET.to_string(),
                message: format!("binding must be a (name value) list, found {}", binding),
            });
        };
        let [name_expr, value_expr] = pair.as_slice() else {
            return Err(LispError::InvalidArguments {
                operator: LET.to_string(),
                message: format!("binding must be a (name value) list, found {}", binding),
            });
        };

        let name = bindable_name(name_expr, LET)?;
        let value = main_eval(value_expr, Rc::clone(&let_env))?;
        debug!(variable_name = %name, value = %value, "'let' binding");
        let_env.borrow_mut().define(name, value);
    }

    eval_body(body, let_env)
}

#[cfg(test)]
mod tests {
    use crate::engine::ast::Expr;
    use crate::engine::env::Environment;
    use crate::engine::eval::{LispError, evaluate_source};
    use crate::logging::init_test_logging;
    use std::rc::Rc;

    fn eval_str(code: &str) -> Result<Expr, LispError> {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source(code, env).map(|value| value.unwrap_or(Expr::Unspecified))
    }

    #[test]
    fn eval_let_binding() {
        assert_eq!(eval_str("(let ((a 5) (b (+ 5 1))) (+ a b))"), Ok(Expr::Int(11)));
    }

    #[test]
    fn eval_let_bindings_see_earlier_bindings() {
        assert_eq!(eval_str("(let ((a 2) (b (* a 10))) b)"), Ok(Expr::Int(20)));
    }

    #[test]
    fn eval_let_body_returns_last_value() {
        assert_eq!(eval_str("(let () 1 2 3)"), Ok(Expr::Int(3)));
    }

    #[test]
    fn eval_let_does_not_leak_bindings() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source("(define a 1) (let ((a 2)) a)", Rc::clone(&env)).unwrap();
        assert_eq!(env.borrow().get("a"), Some(Expr::Int(1)));
    }

    #[test]
    fn eval_let_missing_body() {
        assert_eq!(
            eval_str("(let ((a 1)))"),
            Err(LispError::ArityMismatch(
                "'let' expects at least one body expression".to_string()
            ))
        );
    }

    #[test]
    fn eval_let_malformed_bindings() {
        assert!(matches!(
            eval_str("(let (a 1) a)"),
            Err(LispError::InvalidArguments { .. })
        ));
        assert!(matches!(
            eval_str("(let ((a 1 2)) a)"),
            Err(LispError::InvalidArguments { .. })
        ));
        assert!(matches!(
            eval_str("(let x x)"),
            Err(LispError::TypeError { .. })
        ));
    }

    #[test]
    fn eval_let_error_binding_reserved_keyword() {
        assert_eq!(
            eval_str("(let ((quote 1)) 2)"),
            Err(LispError::ReservedKeyword("quote".to_string()))
        );
    }
}
