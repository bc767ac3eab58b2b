//! Defines special forms (keywords) for the interpreter.

pub const QUOTE: &str = "quote";
pub const IF: &str = "if";
pub const COND: &str = "cond";
pub const DEFINE: &str = "define";
pub const SET: &str = "set!";
pub const LAMBDA: &str = "lambda";
pub const LET: &str = "let";
pub const BEGIN: &str = "begin";
pub const MODULE: &str = "module";

/// Marks the catch-all clause of `cond`. Not reserved.
pub const ELSE: &str = "else";

/// Special form names. These are reserved and cannot be bound as variables.
pub const SPECIAL_FORMS: &[&str] = &[
    QUOTE, IF, COND, DEFINE, SET, LAMBDA, LET, BEGIN, MODULE,
];

/// Checks if a given name is a special form.
pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}
