use crate::engine::ast::{Expr, NativeFn};
use crate::engine::eval::LispError;
use tracing::{debug, trace};

/// Pair and list procedures registered in the prelude.
pub const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("cons", native_cons),
    ("car", native_car),
    ("cdr", native_cdr),
    ("list", native_list),
    ("length", native_list_length),
    ("null?", native_is_null),
    ("pair?", native_is_pair),
];

fn expect_arity(op_name: &str, args: &[Expr], expected: usize) -> Result<(), LispError> {
    if args.len() != expected {
        let msg = format!("{} expects {} argument(s), got {}", op_name, expected, args.len());
        debug!("{}", msg);
        return Err(LispError::ArityMismatch(msg));
    }
    Ok(())
}

fn native_cons(mut args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native list function: cons");
    expect_arity("cons", &args, 2)?;
    let cdr = args.pop().unwrap_or(Expr::Nil);
    let car = args.pop().unwrap_or(Expr::Nil);
    Ok(Expr::cons(car, cdr))
}

fn native_car(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native list function: car");
    expect_arity("car", &args, 1)?;
    match &args[0] {
        Expr::Cons(pair) => Ok(pair.car.clone()),
        other => Err(LispError::type_error("Pair", other)),
    }
}

fn native_cdr(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native list function: cdr");
    expect_arity("cdr", &args, 1)?;
    match &args[0] {
        Expr::Cons(pair) => Ok(pair.cdr.clone()),
        other => Err(LispError::type_error("Pair", other)),
    }
}

fn native_list(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native list function: list");
    Ok(Expr::list_from(args))
}

fn native_list_length(args: Vec<Expr>) -> Result<Expr, LispError> {
    trace!("Executing native list function: length");
    expect_arity("length", &args, 1)?;
    match args[0].list_items() {
        Some(items) => Ok(Expr::Int(items.len() as i64)),
        None => Err(LispError::TypeError {
            expected: "List or Nil".to_string(),
            found: format!("{:?}", args[0]),
        }),
    }
}

fn native_is_null(args: Vec<Expr>) -> Result<Expr, LispError> {
    expect_arity("null?", &args, 1)?;
    Ok(Expr::Bool(matches!(args[0], Expr::Nil)))
}

fn native_is_pair(args: Vec<Expr>) -> Result<Expr, LispError> {
    expect_arity("pair?", &args, 1)?;
    Ok(Expr::Bool(matches!(args[0], Expr::Cons(_))))
}
