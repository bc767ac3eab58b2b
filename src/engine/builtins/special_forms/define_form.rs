use crate::engine::ast::Expr;
use crate::engine::builtins::special_forms::bindable_name;
use crate::engine::builtins::special_forms::lambda_form::make_function;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval};
use crate::engine::special_forms::DEFINE;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(define name expr)` or `(define (name params...) body...)`. Binds in the
/// current environment.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_define(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'define' special form");
    let Some((target, rest)) = args.split_first() else {
        return Err(LispError::ArityMismatch(
            "'define' expects 2 arguments, got 0".to_string(),
        ));
    };

    let (name, value) = match target {
        // Procedure shorthand: (define (f x) body...)
        Expr::List(signature) => {
            let Some((name_expr, params)) = signature.split_first() else {
                return Err(LispError::InvalidArguments {
                    operator: DEFINE.to_string(),
                    message: "procedure signature is empty".to_string(),
                });
            };
            let name = bindable_name(name_expr, DEFINE)?;
            let params = Expr::List(params.to_vec());
            let function = make_function(DEFINE, &params, rest, Rc::clone(&env))?;
            (name, function)
        }
        _ => {
            if rest.len() != 1 {
                return Err(LispError::ArityMismatch(format!(
                    "'define' expects 2 arguments, got {}",
                    args.len()
                )));
            }
            let name = bindable_name(target, DEFINE)?;
            let value = main_eval(&rest[0], Rc::clone(&env))?;
            (name, value)
        }
    };

    debug!(variable_name = %name, "Defined variable");
    env.borrow_mut().define(name, value);
    Ok(Expr::Unspecified)
}

#[cfg(test)]
mod tests {
    use crate::engine::ast::Expr;
    use crate::engine::env::Environment;
    use crate::engine::eval::{LispError, evaluate_source};
    use crate::logging::init_test_logging;
    use std::rc::Rc;

    fn eval_in(
        code: &str,
        env: &Rc<std::cell::RefCell<Environment>>,
    ) -> Result<Option<Expr>, LispError> {
        evaluate_source(code, Rc::clone(env))
    }

    #[test]
    fn define_binds_evaluated_value() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(eval_in("(define x (+ 1 2))", &env), Ok(Some(Expr::Unspecified)));
        assert_eq!(env.borrow().get("x"), Some(Expr::Int(3)));
    }

    #[test]
    fn define_procedure_shorthand() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        eval_in("(define (square x) (* x x))", &env).unwrap();
        assert_eq!(eval_in("(square 7)", &env), Ok(Some(Expr::Int(49))));
    }

    #[test]
    fn define_inside_function_is_local() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        eval_in("(define (f) (define hidden 1) hidden)", &env).unwrap();
        assert_eq!(eval_in("(f)", &env), Ok(Some(Expr::Int(1))));
        assert_eq!(env.borrow().get("hidden"), None);
    }

    #[test]
    fn define_arity_errors() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(
            eval_in("(define x)", &env),
            Err(LispError::ArityMismatch(
                "'define' expects 2 arguments, got 1".to_string()
            ))
        );
        assert!(matches!(
            eval_in("(define x 1 2)", &env),
            Err(LispError::ArityMismatch(_))
        ));
    }

    #[test]
    fn define_rejects_bad_names() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(
            eval_in("(define lambda 1)", &env),
            Err(LispError::ReservedKeyword("lambda".to_string()))
        );
        assert!(matches!(
            eval_in("(define 5 1)", &env),
            Err(LispError::TypeError { .. })
        ));
        assert!(matches!(
            eval_in("(define () 1)", &env),
            Err(LispError::InvalidArguments { .. })
        ));
    }
}
