use crate::engine::env::Environment;
use crate::engine::eval::LispError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct LispFunction {
    pub params: Vec<String>,
    pub body: Vec<Expr>,
    pub closure: Rc<RefCell<Environment>>,
}

impl fmt::Debug for LispFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LispFunction")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("closure", &"<captured_env>") // Avoid printing the whole env
            .finish()
    }
}

// Functions are equal if their parameters and body are structurally equal.
// The captured environment is not considered.
impl PartialEq for LispFunction {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body
    }
}

/// Type alias for a native Rust function that can be called from Lisp.
/// It takes already-evaluated arguments.
pub type NativeFn = fn(Vec<Expr>) -> Result<Expr, LispError>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("func", &"<native_fn_ptr>")
            .finish()
    }
}

// Native function names are unique within the prelude.
impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A runtime pair. Proper lists are chains of pairs ending in `Expr::Nil`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub car: Expr,
    pub cdr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Symbol(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
    /// An unevaluated form as produced by the parser.
    List(Vec<Expr>),
    Cons(Rc<Pair>),
    Function(LispFunction),
    NativeFunction(NativeFunction),
    /// Result of forms evaluated only for their effect.
    Unspecified,
}

impl Expr {
    pub fn symbol(name: &str) -> Expr {
        Expr::Symbol(name.to_string())
    }

    pub fn cons(car: Expr, cdr: Expr) -> Expr {
        Expr::Cons(Rc::new(Pair { car, cdr }))
    }

    /// Builds a proper list from the given items.
    pub fn list_from<I>(items: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Expr::Nil, |tail, head| Expr::cons(head, tail))
    }

    /// Collects the elements of a proper list. Returns `None` for improper lists
    /// and non-list values.
    pub fn list_items(&self) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Expr::Nil => return Some(items),
                Expr::Cons(pair) => {
                    items.push(pair.car.clone());
                    current = &pair.cdr;
                }
                _ => return None,
            }
        }
    }

    /// Turns parsed code into quoted data: code lists become pair chains.
    pub fn to_datum(&self) -> Expr {
        match self {
            Expr::List(items) => {
                Expr::list_from(items.iter().map(Expr::to_datum).collect::<Vec<_>>())
            }
            other => other.clone(),
        }
    }

    /// `#f` and nil are false; every other value is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Expr::Bool(false) | Expr::Nil)
    }

    /// Text written by `display`: strings appear without quotes.
    pub fn to_display_string(&self) -> String {
        match self {
            Expr::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Float(n) => write_float(f, *n),
            Expr::Str(s) => write_string_literal(f, s),
            Expr::Bool(true) => write!(f, "#t"),
            Expr::Bool(false) => write!(f, "#f"),
            Expr::Nil => write!(f, "()"),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Expr::Cons(pair) => {
                write!(f, "({}", pair.car)?;
                let mut rest = &pair.cdr;
                loop {
                    match rest {
                        Expr::Nil => break,
                        Expr::Cons(next) => {
                            write!(f, " {}", next.car)?;
                            rest = &next.cdr;
                        }
                        tail => {
                            write!(f, " . {}", tail)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Expr::Function(func) => write!(f, "#<lambda ({})>", func.params.join(" ")),
            Expr::NativeFunction(native) => write!(f, "#<builtin {}>", native.name),
            Expr::Unspecified => Ok(()),
        }
    }
}
