use crate::engine::ast::Expr;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval, eval_body};
use crate::engine::special_forms::{COND, ELSE};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(cond (test body...) ... (else body...))`. The first clause whose test is
/// truthy is taken; a clause without a body yields the test value.
#[instrument(level = "trace", skip(args, env))]
pub fn eval_cond(args: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    trace!("Executing 'cond' special form");
    for (index, clause) in args.iter().enumerate() {
        let Expr::List(parts) = clause else {
            return Err(LispError::InvalidArguments {
                operator: COND.to_string(),
                message: format!("clause {} is not a list: {}", index + 1, clause),
            });
        };
        let Some((test, body)) = parts.split_first() else {
            return Err(LispError::InvalidArguments {
                operator: COND.to_string(),
                message: format!("clause {} is empty", index + 1),
            });
        };

        let test_value = match test {
            Expr::Symbol(s) if s == ELSE => Expr::Bool(true),
            _ => main_eval(test, Rc::clone(&env))?,
        };

        if test_value.is_truthy() {
            debug!(clause = index + 1, "cond clause matched");
            if body.is_empty() {
                return Ok(test_value);
            }
            return eval_body(body, env);
        }
    }
    Err(LispError::Evaluation("cond: no clause matched".to_string()))
}

#[cfg(test)]
mod tests {
    use crate::engine::ast::Expr;
    use crate::engine::env::Environment;
    use crate::engine::eval::{LispError, evaluate_source};
    use crate::logging::init_test_logging;

    fn eval_str(code: &str) -> Result<Expr, LispError> {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source(code, env).map(|value| value.unwrap_or(Expr::Unspecified))
    }

    #[test]
    fn first_truthy_clause_wins() {
        assert_eq!(
            eval_str("(cond ((< 2 1) 'a) ((< 1 2) 'b) (#t 'c))"),
            Ok(Expr::symbol("b"))
        );
    }

    #[test]
    fn else_clause() {
        assert_eq!(eval_str("(cond (#f 1) (else 2))"), Ok(Expr::Int(2)));
    }

    #[test]
    fn clause_body_returns_last_value() {
        assert_eq!(eval_str("(cond (#t 1 2 3))"), Ok(Expr::Int(3)));
    }

    #[test]
    fn clause_without_body_returns_test_value() {
        assert_eq!(eval_str("(cond (#f) (42))"), Ok(Expr::Int(42)));
    }

    #[test]
    fn later_clauses_are_not_evaluated() {
        assert_eq!(eval_str("(cond (#t 1) ((undefined) 2))"), Ok(Expr::Int(1)));
    }

    #[test]
    fn no_matching_clause_is_an_error() {
        assert_eq!(
            eval_str("(cond (#f 1) ((= 1 2) 2))"),
            Err(LispError::Evaluation("cond: no clause matched".to_string()))
        );
    }

    #[test]
    fn malformed_clause() {
        assert!(matches!(
            eval_str("(cond 5)"),
            Err(LispError::InvalidArguments { .. })
        ));
        assert!(matches!(
            eval_str("(cond ())"),
            Err(LispError::InvalidArguments { .. })
        ));
    }
}
