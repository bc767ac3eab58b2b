// Declare modules for each special form
pub mod begin_form;
pub mod cond_form;
pub mod define_form;
pub mod if_form;
pub mod lambda_form;
pub mod let_form;
pub mod module_form;
pub mod quote_form;
pub mod set_form;

use crate::engine::ast::Expr;
use crate::engine::eval::LispError;
use crate::engine::special_forms as special_form_constants;
use tracing::debug;

// Re-export public evaluation functions
pub use begin_form::eval_begin;
pub use cond_form::eval_cond;
pub use define_form::eval_define;
pub use if_form::eval_if;
pub use lambda_form::eval_lambda;
pub use let_form::eval_let;
pub use module_form::eval_module;
pub use quote_form::eval_quote;
pub use set_form::eval_set;

/// Extracts a name that may be bound by `form`, rejecting non-symbols and
/// reserved keywords.
pub(crate) fn bindable_name(expr: &Expr, form: &str) -> Result<String, LispError> {
    match expr {
        Expr::Symbol(name) if special_form_constants::is_special_form(name) => {
            debug!(form, attempted_keyword = %name, "Attempted to bind a reserved keyword");
            Err(LispError::ReservedKeyword(name.clone()))
        }
        Expr::Symbol(name) => Ok(name.clone()),
        other => {
            debug!(form, found = ?other, "Binding target is not a symbol");
            Err(LispError::type_error("Symbol", other))
        }
    }
}
