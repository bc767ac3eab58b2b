use crate::engine::special_forms::{ELSE, is_special_form};
use lazy_static::lazy_static;
use owo_colors::OwoColorize;
use regex::Regex;
use rustyline::highlight::Highlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Hinter};
use std::borrow::Cow::{self, Borrowed, Owned};

lazy_static! {
    // One alternative per token class; unterminated strings still highlight.
    static ref TOKEN_RE: Regex = Regex::new(
        concat!(
            r#"(?P<string>"(?:[^"\\]|\\.)*"?)|(?P<comment>;.*)|(?P<paren>[()])"#,
            r#"|(?P<quote>')|(?P<atom>[^\s()'";]+)"#,
        )
    )
    .unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"^[+-]?\d+(\.\d*)?([eE][+-]?\d+)?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Keyword,
    Literal,
    Number,
    Plain,
}

fn classify_atom(atom: &str) -> TokenClass {
    if is_special_form(atom) || atom == ELSE {
        TokenClass::Keyword
    } else if matches!(atom, "#t" | "#f" | "#nil" | "true" | "false" | "nil") {
        TokenClass::Literal
    } else if NUMBER_RE.is_match(atom) {
        TokenClass::Number
    } else {
        TokenClass::Plain
    }
}

/// Returns `line` with ANSI colors applied to each token.
pub(crate) fn colorize(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    let mut last_end = 0;
    for caps in TOKEN_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&line[last_end..whole.start()]);
        let text = whole.as_str();
        if caps.name("string").is_some() {
            out.push_str(&text.green().to_string());
        } else if caps.name("comment").is_some() {
            out.push_str(&text.bright_black().to_string());
        } else if caps.name("paren").is_some() || caps.name("quote").is_some() {
            out.push_str(&text.blue().to_string());
        } else {
            match classify_atom(text) {
                TokenClass::Keyword => out.push_str(&text.cyan().bold().to_string()),
                TokenClass::Literal => out.push_str(&text.yellow().to_string()),
                TokenClass::Number => out.push_str(&text.magenta().to_string()),
                TokenClass::Plain => out.push_str(text),
            }
        }
        last_end = whole.end();
    }
    out.push_str(&line[last_end..]);
    out
}

/// Net count of open parentheses, ignoring those inside strings and comments.
/// `None` means a string literal is still open.
pub(crate) fn open_paren_depth(input: &str) -> Option<i64> {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escaped = false;
    for c in input.chars() {
        if in_comment {
            in_comment = c != '\n';
        } else if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                '"' => in_string = true,
                ';' => in_comment = true,
                _ => {}
            }
        }
    }
    if in_string { None } else { Some(depth) }
}

#[derive(Helper, Completer, Hinter, Default)]
pub struct ReplHelper {}

impl ReplHelper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            Borrowed(line)
        } else {
            Owned(colorize(line))
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        !line.is_empty()
    }
}

// Keeps reading lines until every open parenthesis is closed. Extra closing
// parentheses are left for the parser to report.
impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        match open_paren_depth(ctx.input()) {
            None => Ok(ValidationResult::Incomplete),
            Some(depth) if depth > 0 => Ok(ValidationResult::Incomplete),
            Some(_) => Ok(ValidationResult::Valid(None)),
        }
    }
}
