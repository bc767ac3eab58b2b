use crate::engine::ast::{Expr, NativeFn};
use crate::engine::eval::LispError;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Math procedures registered in the prelude.
pub const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("+", native_add),
    ("-", native_subtract),
    ("*", native_multiply),
    ("/", native_divide),
    ("pow", native_pow),
    ("exp", native_exp),
    ("abs", native_abs),
    ("quotient", native_quotient),
    ("remainder", native_remainder),
    ("modulo", native_modulo),
    ("=", native_equals),
    ("<", native_less_than),
    (">", native_greater_than),
    ("<=", native_less_than_or_equal),
    (">=", native_greater_than_or_equal),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    fn into_expr(self) -> Expr {
        match self {
            Number::Int(n) => Expr::Int(n),
            Number::Float(n) => Expr::Float(n),
        }
    }
}

fn as_number(expr: &Expr) -> Option<Number> {
    match expr {
        Expr::Int(n) => Some(Number::Int(*n)),
        Expr::Float(n) => Some(Number::Float(*n)),
        _ => None,
    }
}

fn extract_number(expr: &Expr, op_name: &str) -> Result<Number, LispError> {
    as_number(expr).ok_or_else(|| {
        let type_error = LispError::type_error("Number", expr);
        debug!(operator = %op_name, error = %type_error, "Type error in native function");
        type_error
    })
}

fn extract_int(expr: &Expr, op_name: &str) -> Result<i64, LispError> {
    match expr {
        Expr::Int(n) => Ok(*n),
        _ => {
            let type_error = LispError::type_error("Int", expr);
            debug!(operator = %op_name, error = %type_error, "Type error in native function");
            Err(type_error)
        }
    }
}

fn overflow(op_name: &str) -> LispError {
    LispError::ValueError(format!("integer overflow in '{}'", op_name))
}

fn expect_arity(op_name: &str, args: &[Expr], expected: usize) -> Result<(), LispError> {
    if args.len() != expected {
        return Err(LispError::ArityMismatch(format!(
            "Native '{}' expects {} argument(s), got {}",
            op_name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

// Integer results stay exact; any float operand promotes the result to a float.
fn combine(
    op_name: &str,
    lhs: Number,
    rhs: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, LispError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => int_op(a, b)
            .map(Number::Int)
            .ok_or_else(|| overflow(op_name)),
        (a, b) => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

fn fold_numbers(
    op_name: &str,
    init: Number,
    args: &[Expr],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Expr, LispError> {
    let mut acc = init;
    for arg in args {
        acc = combine(op_name, acc, extract_number(arg, op_name)?, int_op, float_op)?;
    }
    Ok(acc.into_expr())
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_add(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native '+' function");
    fold_numbers("+", Number::Int(0), &args, i64::checked_add, |a, b| a + b)
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_multiply(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native '*' function");
    fold_numbers("*", Number::Int(1), &args, i64::checked_mul, |a, b| a * b)
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_subtract(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native '-' function");
    let Some((first, rest)) = args.split_first() else {
        return Err(LispError::ArityMismatch(
            "Native '-' expects at least 1 argument, got 0".to_string(),
        ));
    };
    let first_val = extract_number(first, "-")?;

    if rest.is_empty() {
        // Negation: (- x)
        return combine("-", Number::Int(0), first_val, i64::checked_sub, |a, b| a - b)
            .map(Number::into_expr);
    }
    fold_numbers("-", first_val, rest, i64::checked_sub, |a, b| a - b)
}

/// Division always produces a float.
#[tracing::instrument(level = "trace", skip(args))]
pub fn native_divide(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native '/' function");
    let Some((first, rest)) = args.split_first() else {
        return Err(LispError::ArityMismatch(
            "Native '/' expects at least 1 argument, got 0".to_string(),
        ));
    };
    let first_val = extract_number(first, "/")?.as_f64();

    if rest.is_empty() {
        // Reciprocal: (/ x)
        if first_val == 0.0 {
            return Err(LispError::DivisionByZero(
                "Division by zero in native '/' (reciprocal of 0)".to_string(),
            ));
        }
        return Ok(Expr::Float(1.0 / first_val));
    }

    let mut result = first_val;
    for (i, arg_expr) in rest.iter().enumerate() {
        let divisor = extract_number(arg_expr, "/")?.as_f64();
        if divisor == 0.0 {
            return Err(LispError::DivisionByZero(format!(
                "Division by zero in native '/' (argument {})",
                i + 2
            )));
        }
        result /= divisor;
    }
    Ok(Expr::Float(result))
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_pow(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native 'pow' function");
    expect_arity("pow", &args, 2)?;
    let base = extract_number(&args[0], "pow")?;
    let exponent = extract_number(&args[1], "pow")?;
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| overflow("pow"))?;
            b.checked_pow(e).map(Expr::Int).ok_or_else(|| overflow("pow"))
        }
        (b, e) => Ok(Expr::Float(b.as_f64().powf(e.as_f64()))),
    }
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_exp(args: Vec<Expr>) -> Result<Expr, LispError> {
    expect_arity("exp", &args, 1)?;
    Ok(Expr::Float(extract_number(&args[0], "exp")?.as_f64().exp()))
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_abs(args: Vec<Expr>) -> Result<Expr, LispError> {
    expect_arity("abs", &args, 1)?;
    match extract_number(&args[0], "abs")? {
        Number::Int(n) => n.checked_abs().map(Expr::Int).ok_or_else(|| overflow("abs")),
        Number::Float(n) => Ok(Expr::Float(n.abs())),
    }
}

fn integer_division(
    op_name: &str,
    args: &[Expr],
    op: fn(i64, i64) -> Option<i64>,
) -> Result<Expr, LispError> {
    expect_arity(op_name, args, 2)?;
    let dividend = extract_int(&args[0], op_name)?;
    let divisor = extract_int(&args[1], op_name)?;
    if divisor == 0 {
        return Err(LispError::DivisionByZero(format!(
            "Division by zero in native '{}'",
            op_name
        )));
    }
    op(dividend, divisor).map(Expr::Int).ok_or_else(|| overflow(op_name))
}

pub fn native_quotient(args: Vec<Expr>) -> Result<Expr, LispError> {
    integer_division("quotient", &args, i64::checked_div)
}

pub fn native_remainder(args: Vec<Expr>) -> Result<Expr, LispError> {
    integer_division("remainder", &args, i64::checked_rem)
}

/// Like `remainder`, but the result takes the sign of the divisor.
pub fn native_modulo(args: Vec<Expr>) -> Result<Expr, LispError> {
    integer_division("modulo", &args, |a, b| {
        let r = a.checked_rem(b)?;
        if r != 0 && (r < 0) != (b < 0) {
            r.checked_add(b)
        } else {
            Some(r)
        }
    })
}

fn compare_numbers(lhs: Number, rhs: Number) -> Option<Ordering> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// Equality used by `=`: numbers compare by value across Int and Float,
/// everything else structurally.
pub fn values_equal(lhs: &Expr, rhs: &Expr) -> bool {
    match (as_number(lhs), as_number(rhs)) {
        (Some(a), Some(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        _ => lhs == rhs,
    }
}

#[tracing::instrument(level = "trace", skip(args))]
pub fn native_equals(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native '=' function");
    if args.len() < 2 {
        return Err(LispError::ArityMismatch(format!(
            "Native '=' expects at least 2 arguments, got {}",
            args.len()
        )));
    }
    Ok(Expr::Bool(
        args.windows(2).all(|pair| values_equal(&pair[0], &pair[1])),
    ))
}

fn compare_values(op_name: &str, lhs: &Expr, rhs: &Expr) -> Result<Option<Ordering>, LispError> {
    match (lhs, rhs) {
        (Expr::Str(a), Expr::Str(b)) => Ok(Some(a.cmp(b))),
        _ => Ok(compare_numbers(
            extract_number(lhs, op_name)?,
            extract_number(rhs, op_name)?,
        )),
    }
}

fn compare_chain(
    op_name: &str,
    args: &[Expr],
    accept: fn(Ordering) -> bool,
) -> Result<Expr, LispError> {
    if args.len() < 2 {
        return Err(LispError::ArityMismatch(format!(
            "Native '{}' expects at least 2 arguments, got {}",
            op_name,
            args.len()
        )));
    }
    for pair in args.windows(2) {
        match compare_values(op_name, &pair[0], &pair[1])? {
            Some(ordering) if accept(ordering) => continue,
            _ => return Ok(Expr::Bool(false)),
        }
    }
    Ok(Expr::Bool(true))
}

// Helper macro to generate comparison functions
macro_rules! define_comparison_fn {
    ($fn_name:ident, $op_str:expr, $accepted:pat) => {
        #[tracing::instrument(level = "trace", skip(args))]
        pub fn $fn_name(args: Vec<Expr>) -> Result<Expr, LispError> {
            trace!("Executing native '{}' function", $op_str);
            compare_chain($op_str, &args, |ordering| matches!(ordering, $accepted))
        }
    };
}

define_comparison_fn!(native_less_than, "<", Ordering::Less);
define_comparison_fn!(native_greater_than, ">", Ordering::Greater);
define_comparison_fn!(native_less_than_or_equal, "<=", Ordering::Less | Ordering::Equal);
define_comparison_fn!(native_greater_than_or_equal, ">=", Ordering::Greater | Ordering::Equal);
