use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{
        char, digit0, digit1, multispace1, none_of, not_line_ending, one_of, satisfy,
    },
    combinator::{map_res, not, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use tracing::trace;

use crate::engine::ast::Expr;
use crate::engine::eval::LispError;
use crate::engine::special_forms::QUOTE;

const SYMBOL_PUNCTUATION: &str = "!$%&*/:<=>?@^_~+-";

fn is_symbol_initial(c: char) -> bool {
    c.is_alphanumeric() || SYMBOL_PUNCTUATION.contains(c)
}

fn is_symbol_subsequent(c: char) -> bool {
    is_symbol_initial(c) || c == '.' || c == '#'
}

// Whitespace and `;` line comments.
fn skip_ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(char(';'), not_line_ending)),
        ))),
    )
    .parse(input)
}

// Succeeds only when the next character cannot continue an atom.
fn atom_end(input: &str) -> IResult<&str, ()> {
    not(satisfy(is_symbol_subsequent)).parse(input)
}

fn number_text(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(one_of("+-")),
        digit1,
        opt((char('.'), digit0)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

// Integers that overflow i64 are read as floats.
fn number_from_text(text: &str) -> Result<Expr, std::num::ParseFloatError> {
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().map(Expr::Float);
    }
    match text.parse::<i64>() {
        Ok(n) => Ok(Expr::Int(n)),
        Err(_) => text.parse::<f64>().map(Expr::Float),
    }
}

#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
fn parse_number_raw(input: &str) -> IResult<&str, Expr> {
    map_res(terminated(number_text, atom_end), number_from_text).parse(input)
}

fn parse_bool_raw(input: &str) -> IResult<&str, Expr> {
    terminated(
        alt((
            value(Expr::Bool(true), alt((tag("#t"), tag("true")))),
            value(Expr::Bool(false), alt((tag("#f"), tag("false")))),
        )),
        atom_end,
    )
    .parse(input)
}

fn parse_nil_raw(input: &str) -> IResult<&str, Expr> {
    terminated(value(Expr::Nil, alt((tag("#nil"), tag("nil")))), atom_end).parse(input)
}

fn parse_string_raw(input: &str) -> IResult<&str, Expr> {
    let escaped = preceded(
        char('\\'),
        alt((
            value('"', char('"')),
            value('\\', char('\\')),
            value('\n', char('n')),
            value('\t', char('t')),
        )),
    );
    delimited(char('"'), many0(alt((none_of("\\\""), escaped))), char('"'))
        .map(|chars: Vec<char>| Expr::Str(chars.into_iter().collect()))
        .parse(input)
}

#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
fn parse_symbol_raw(input: &str) -> IResult<&str, Expr> {
    recognize(pair(
        satisfy(is_symbol_initial),
        many0(satisfy(is_symbol_subsequent)),
    ))
    .map(|s: &str| Expr::Symbol(s.to_string()))
    .parse(input)
}

// `'datum` is shorthand for `(quote datum)`.
fn parse_quoted_raw(input: &str) -> IResult<&str, Expr> {
    preceded(char('\''), preceded(skip_ws, expr_recursive_impl))
        .map(|datum| Expr::List(vec![Expr::symbol(QUOTE), datum]))
        .parse(input)
}

#[tracing::instrument(level = "trace", skip(input), fields(input = %input))]
fn list_raw(input: &str) -> IResult<&str, Expr> {
    delimited(
        char('('),
        many0(preceded(skip_ws, expr_recursive_impl)),
        preceded(skip_ws, char(')')),
    )
    .map(Expr::List)
    .parse(input)
}

// Core recursive parser for a single expression, without surrounding whitespace.
fn expr_recursive_impl(input: &str) -> IResult<&str, Expr> {
    alt((
        parse_number_raw,
        parse_bool_raw,
        parse_nil_raw,
        parse_string_raw,
        parse_quoted_raw,
        list_raw,
        parse_symbol_raw,
    ))
    .parse(input)
}

/// Parses a single expression, consuming whitespace and comments around it.
pub fn parse_expr(input: &str) -> IResult<&str, Expr> {
    trace!("Attempting to parse expression");
    delimited(skip_ws, expr_recursive_impl, skip_ws).parse(input)
}

/// Parses every top-level expression in `input`.
pub fn parse_program(input: &str) -> Result<Vec<Expr>, LispError> {
    let (remaining, forms) = terminated(many0(parse_expr), skip_ws)
        .parse(input)
        .map_err(|e| LispError::Parse(e.to_string()))?;

    if !remaining.is_empty() {
        let snippet: String = remaining.chars().take(24).collect();
        return Err(LispError::Parse(format!(
            "unbalanced or unexpected input near '{}'",
            snippet
        )));
    }
    Ok(forms)
}
