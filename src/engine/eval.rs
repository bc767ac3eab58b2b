use crate::engine::ast::Expr;
use crate::engine::builtins::special_forms;
use crate::engine::env::Environment;
use crate::engine::parser::parse_program;
use crate::engine::special_forms as special_form_constants;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument, trace};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LispError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Type error: expected {expected}, found {found}")]
    TypeError { expected: String, found: String },
    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(String),
    #[error("Invalid arguments for operator '{operator}': {message}")]
    InvalidArguments { operator: String, message: String },
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),
    #[error("Cannot bind reserved keyword: {0}")]
    ReservedKeyword(String),
    #[error("Not a function: {0}")]
    NotAFunction(String),
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
    #[error("Value error: {0}")]
    ValueError(String),
}

impl LispError {
    pub fn type_error(expected: &str, found: &Expr) -> Self {
        LispError::TypeError {
            expected: expected.to_string(),
            found: format!("{:?}", found),
        }
    }
}

#[instrument(level = "trace", skip(expr, env), fields(expr = %expr))]
pub fn eval(expr: &Expr, env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    match expr {
        Expr::Int(_)
        | Expr::Float(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Nil
        | Expr::Cons(_)
        | Expr::Function(_)
        | Expr::NativeFunction(_)
        | Expr::Unspecified => Ok(expr.clone()),
        Expr::Symbol(s) => env.borrow().get(s).ok_or_else(|| {
            debug!(symbol_name = %s, "Undefined symbol encountered");
            LispError::UndefinedSymbol(s.clone())
        }),
        Expr::List(list) => {
            let Some((first_form, args)) = list.split_first() else {
                trace!("Empty list evaluates to nil");
                return Ok(Expr::Nil);
            };

            if let Expr::Symbol(s) = first_form {
                match s.as_str() {
                    special_form_constants::QUOTE => return special_forms::eval_quote(args),
                    special_form_constants::IF => return special_forms::eval_if(args, env),
                    special_form_constants::COND => return special_forms::eval_cond(args, env),
                    special_form_constants::DEFINE => {
                        return special_forms::eval_define(args, env);
                    }
                    special_form_constants::SET => return special_forms::eval_set(args, env),
                    special_form_constants::LAMBDA => {
                        return special_forms::eval_lambda(args, env);
                    }
                    special_form_constants::LET => return special_forms::eval_let(args, env),
                    special_form_constants::BEGIN => return special_forms::eval_begin(args, env),
                    special_form_constants::MODULE => {
                        return special_forms::eval_module(args, env);
                    }
                    _ => {}
                }
            }

            trace!("First element is not a special form, evaluating function call");
            let func = eval(first_form, Rc::clone(&env))?;
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg_expr in args {
                evaluated_args.push(eval(arg_expr, Rc::clone(&env))?);
            }
            apply(func, evaluated_args)
        }
    }
}

/// Evaluates a sequence of forms and returns the value of the last one.
pub fn eval_body(body: &[Expr], env: Rc<RefCell<Environment>>) -> Result<Expr, LispError> {
    let mut result = Expr::Nil;
    for expr in body {
        result = eval(expr, Rc::clone(&env))?;
    }
    Ok(result)
}

/// Applies a function (Lisp or native) to a list of evaluated arguments.
#[instrument(level = "trace", skip(func, args), fields(func = %func, argc = args.len()))]
pub fn apply(func: Expr, args: Vec<Expr>) -> Result<Expr, LispError> {
    match func {
        Expr::Function(lisp_fn) => {
            if args.len() != lisp_fn.params.len() {
                debug!(
                    expected = lisp_fn.params.len(),
                    got = args.len(),
                    "Arity mismatch for function call"
                );
                return Err(LispError::ArityMismatch(format!(
                    "Function expects {} arguments, got {}",
                    lisp_fn.params.len(),
                    args.len()
                )));
            }

            let call_env = Environment::new_enclosed(Rc::clone(&lisp_fn.closure));
            {
                let mut frame = call_env.borrow_mut();
                for (param_name, arg_value) in lisp_fn.params.iter().zip(args) {
                    frame.define(param_name.clone(), arg_value);
                }
            }

            eval_body(&lisp_fn.body, call_env)
        }
        Expr::NativeFunction(native_fn) => {
            trace!(native_function_name = %native_fn.name, "Applying native function");
            (native_fn.func)(args)
        }
        other => {
            debug!(value = %other, "Attempted to call a non-function value");
            Err(LispError::NotAFunction(other.to_string()))
        }
    }
}

/// Parses and evaluates every top-level form in `source`, returning the value
/// of the last one (or `None` when the source holds no forms).
#[instrument(level = "debug", skip(source, env))]
pub fn evaluate_source(
    source: &str,
    env: Rc<RefCell<Environment>>,
) -> Result<Option<Expr>, LispError> {
    let forms = parse_program(source)?;
    debug!(forms = forms.len(), "Parsed source");
    let mut last = None;
    for form in &forms {
        last = Some(eval(form, Rc::clone(&env))?);
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    fn run(source: &str) -> Result<Expr, LispError> {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source(source, env).map(|value| value.unwrap_or(Expr::Unspecified))
    }

    #[test]
    fn eval_number() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(eval(&Expr::Int(42), env), Ok(Expr::Int(42)));
    }

    #[test]
    fn eval_symbol_defined_in_outer_env() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("x".to_string(), Expr::Int(100));
        let inner_env = Environment::new_enclosed(outer_env);
        assert_eq!(eval(&Expr::symbol("x"), inner_env), Ok(Expr::Int(100)));
    }

    #[test]
    fn eval_symbol_undefined() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(
            eval(&Expr::symbol("my_var"), env),
            Err(LispError::UndefinedSymbol("my_var".to_string()))
        );
    }

    #[test]
    fn eval_empty_list_is_nil() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(eval(&Expr::List(vec![]), env), Ok(Expr::Nil));
    }

    #[test]
    fn eval_unknown_function() {
        init_test_logging();
        let env = Environment::new();
        let expr = Expr::List(vec![Expr::symbol("unknown_function"), Expr::Int(1)]);
        assert_eq!(
            eval(&expr, env),
            Err(LispError::UndefinedSymbol("unknown_function".to_string()))
        );
    }

    #[test]
    fn calling_a_number_is_an_error() {
        assert_eq!(run("(1 2)"), Err(LispError::NotAFunction("1".to_string())));
    }

    #[test]
    fn lambda_call_binds_parameters() {
        assert_eq!(run("((lambda (x y) (+ x y)) 1 2)"), Ok(Expr::Int(3)));
    }

    #[test]
    fn lambda_arity_mismatch() {
        assert_eq!(
            run("((lambda (x) x) 1 2)"),
            Err(LispError::ArityMismatch(
                "Function expects 1 arguments, got 2".to_string()
            ))
        );
    }

    #[test]
    fn computed_operator_position() {
        assert_eq!(run("((if #t + *) 2 3)"), Ok(Expr::Int(5)));
        assert_eq!(run("((if #f + *) 2 3)"), Ok(Expr::Int(6)));
    }

    #[test]
    fn recursive_fib() {
        let source = "
            (define fib (lambda (n) (if (<= n 1) n (+ (fib (- n 1)) (fib (- n 2))))))
            (fib 10)";
        assert_eq!(run(source), Ok(Expr::Int(55)));
    }

    #[test]
    fn fib_with_cond() {
        let source = "
            (define fib (lambda (n) (cond ((< n 2) 1) (#t (+ (fib (- n 1)) (fib (- n 2)))))))
            (list (fib 0) (fib 1) (fib 2) (fib 9))";
        assert_eq!(run(source).map(|v| v.to_string()), Ok("(1 1 2 55)".to_string()));
    }

    #[test]
    fn circle_area_uses_float_arithmetic() {
        let source = "
            (define pi 3.141592653)
            (define circle-area (lambda (r) (* pi (* r r))))
            (circle-area 3)";
        match run(source) {
            Ok(Expr::Float(area)) => assert!((area - 28.274333877).abs() < 1e-9),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn closures_keep_private_state() {
        let source = "
            (define make-account
              (lambda (balance)
                (lambda (amt)
                  (begin (set! balance (+ balance amt))
                         balance))))
            (define acc (make-account 10))
            (define other (make-account 100))
            (list (acc 5) (acc 5) (other -20))";
        assert_eq!(run(source).map(|v| v.to_string()), Ok("(15 20 80)".to_string()));
    }

    #[test]
    fn float_account_balances() {
        let env = Environment::new_with_prelude();
        let setup = "
            (define make-account
              (lambda (balance)
                (lambda (amt) (begin (set! balance (+ balance amt)) balance))))
            (define account (make-account 100.00))";
        evaluate_source(setup, Rc::clone(&env)).unwrap();
        assert_eq!(
            evaluate_source("(account -20.00)", Rc::clone(&env)),
            Ok(Some(Expr::Float(80.0)))
        );
        assert_eq!(
            evaluate_source("(account -20.00)", env),
            Ok(Some(Expr::Float(60.0)))
        );
    }

    #[test]
    fn evaluate_source_empty_input() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(evaluate_source("  ; nothing here\n", env), Ok(None));
    }

    #[test]
    fn evaluate_source_stops_at_first_error() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let result = evaluate_source("(define a 1) (car 5) (define b 2)", Rc::clone(&env));
        assert!(matches!(result, Err(LispError::TypeError { .. })));
        assert_eq!(env.borrow().get("a"), Some(Expr::Int(1)));
        assert_eq!(env.borrow().get("b"), None);
    }
}
