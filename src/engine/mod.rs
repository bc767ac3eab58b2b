//! The interpreter core: reader, evaluator, environments and the builtin
//! procedures and special forms.

pub mod ast;
pub mod builtins;
pub mod env;
pub mod eval;
pub mod parser;
pub mod special_forms;
