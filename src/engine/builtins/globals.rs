use crate::engine::ast::{Expr, NativeFn, NativeFunction};
use crate::engine::builtins::{display, list, math};
use crate::engine::env::Environment;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Every native procedure group installed into the root environment.
const PRELUDE_GROUPS: &[&[(&str, NativeFn)]] =
    &[math::FUNCTIONS, list::FUNCTIONS, display::FUNCTIONS];

/// Populates the given environment with the builtin procedures.
pub fn populate_globals(env: Rc<RefCell<Environment>>) {
    let mut root_env_borrowed = env.borrow_mut();
    for (name, func) in PRELUDE_GROUPS.iter().flat_map(|group| group.iter()) {
        trace!(name = %name, "Registering builtin");
        root_env_borrowed.define(
            name.to_string(),
            Expr::NativeFunction(NativeFunction {
                name: name.to_string(),
                func: *func,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    #[test]
    fn builtin_names_are_unique() {
        init_test_logging();
        let mut names: Vec<&str> = PRELUDE_GROUPS
            .iter()
            .flat_map(|group| group.iter().map(|(name, _)| *name))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn natives_are_named_after_their_binding() {
        init_test_logging();
        let env = Environment::new();
        populate_globals(Rc::clone(&env));
        match env.borrow().get("car") {
            Some(Expr::NativeFunction(native)) => assert_eq!(native.name, "car"),
            other => panic!("expected native car, got {:?}", other),
        }
    }
}
