//! A small Scheme-style interpreter. Source is read with nom and evaluated by
//! walking the tree over `Rc<RefCell<Environment>>` frames.

pub mod engine;
pub mod logging;
pub mod repl;

pub use engine::ast::Expr;
pub use engine::env::Environment;
pub use engine::eval::{LispError, eval, evaluate_source};
