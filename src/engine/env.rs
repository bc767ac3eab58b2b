use crate::engine::ast::Expr;
use crate::engine::builtins::globals::populate_globals;
use crate::engine::eval::LispError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, PartialEq)]
pub struct Environment {
    bindings: HashMap<String, Expr>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates a new, empty root environment without any prelude functions.
    pub fn new() -> Rc<RefCell<Self>> {
        debug!("Creating new empty root environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: None,
        }))
    }

    /// Creates a new root environment populated with the builtin procedures.
    pub fn new_with_prelude() -> Rc<RefCell<Self>> {
        debug!("Creating new root environment with prelude");
        let env_rc = Environment::new();
        populate_globals(Rc::clone(&env_rc));
        trace!(bindings = env_rc.borrow().bindings.len(), "Environment after adding prelude");
        env_rc
    }

    /// Creates a new environment that is enclosed by an outer environment.
    pub fn new_enclosed(outer_env: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        trace!("Creating new enclosed environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: Some(outer_env),
        }))
    }

    /// Defines a new variable or redefines an existing one in the current environment.
    pub fn define(&mut self, name: String, value: Expr) {
        trace!(name = %name, value = %value, "Defining variable in current environment");
        self.bindings.insert(name, value);
    }

    /// Retrieves a variable's value, searching outer environments when it is
    /// not bound here.
    pub fn get(&self, name: &str) -> Option<Expr> {
        if let Some(value) = self.bindings.get(name) {
            trace!(name = %name, "Found variable in current environment");
            Some(value.clone())
        } else {
            match &self.outer {
                Some(outer_env) => outer_env.borrow().get(name),
                None => {
                    debug!(name = %name, "Variable not found in any environment");
                    None
                }
            }
        }
    }

    /// Replaces the value of an existing binding in the nearest environment that
    /// holds it.
    pub fn set(&mut self, name: &str, value: Expr) -> Result<(), LispError> {
        if let Some(slot) = self.bindings.get_mut(name) {
            trace!(name = %name, value = %value, "Updating variable in current environment");
            *slot = value;
            return Ok(());
        }
        match &self.outer {
            Some(outer_env) => outer_env.borrow_mut().set(name, value),
            None => {
                debug!(name = %name, "Cannot assign to unbound variable");
                Err(LispError::UndefinedSymbol(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::Expr;
    use crate::logging::init_test_logging;

    #[test]
    fn define_and_get_in_root_env() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("x".to_string(), Expr::Int(10));
        assert_eq!(env.borrow().get("x"), Some(Expr::Int(10)));
    }

    #[test]
    fn get_from_outer_env() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("x".to_string(), Expr::Int(10));

        let inner_env = Environment::new_enclosed(outer_env.clone());
        assert_eq!(inner_env.borrow().get("x"), Some(Expr::Int(10)));
    }

    #[test]
    fn define_in_inner_shadows_outer() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("x".to_string(), Expr::Int(10));

        let inner_env = Environment::new_enclosed(outer_env.clone());
        inner_env.borrow_mut().define("x".to_string(), Expr::Int(20));

        assert_eq!(inner_env.borrow().get("x"), Some(Expr::Int(20)));
        assert_eq!(outer_env.borrow().get("x"), Some(Expr::Int(10)));
    }

    #[test]
    fn get_undefined_variable() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(env.borrow().get("non_existent"), None);
    }

    #[test]
    fn set_updates_nearest_binding() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("a".to_string(), Expr::Nil);
        outer_env.borrow_mut().define("b".to_string(), Expr::Int(1));

        let inner_env = Environment::new_enclosed(outer_env.clone());
        inner_env.borrow_mut().define("a".to_string(), Expr::Int(2));

        inner_env.borrow_mut().set("a", Expr::Int(3)).unwrap();
        inner_env.borrow_mut().set("b", Expr::Int(4)).unwrap();

        assert_eq!(inner_env.borrow().get("a"), Some(Expr::Int(3)));
        assert_eq!(outer_env.borrow().get("a"), Some(Expr::Nil));
        assert_eq!(outer_env.borrow().get("b"), Some(Expr::Int(4)));
    }

    #[test]
    fn set_unbound_variable_is_an_error() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(
            env.borrow_mut().set("missing", Expr::Int(1)),
            Err(LispError::UndefinedSymbol("missing".to_string()))
        );
    }

    #[test]
    fn enclosed_env_outlives_the_frame_that_created_it() {
        init_test_logging();
        let root = Environment::new();
        let frame = Environment::new_enclosed(root.clone());
        frame.borrow_mut().define("a".to_string(), Expr::Int(1));

        let captured = Environment::new_enclosed(frame.clone());
        drop(frame);

        captured.borrow_mut().set("a", Expr::Int(2)).unwrap();
        assert_eq!(captured.borrow().get("a"), Some(Expr::Int(2)));
        assert_eq!(root.borrow().get("a"), None);
    }

    #[test]
    fn prelude_contains_builtins() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        for name in ["+", "-", "<=", "cons", "car", "cdr", "display"] {
            assert!(env.borrow().get(name).is_some(), "missing builtin {}", name);
        }
    }
}
