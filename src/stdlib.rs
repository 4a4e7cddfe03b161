// ABOUTME: Bundles and loads the std/*.scm standard library at startup

use crate::builtins::control::load_source;
use crate::env::Environment;
use std::sync::Arc;

/// `std/*.scm` files, loaded in this order at startup. Listed explicitly
/// (rather than globbed) since there is no build script to do it at
/// compile time — the same approach the interpreter driver uses to
/// enumerate its own startup modules.
const MODULES: &[(&str, &str)] = &[("core", include_str!("../std/core.scm"))];

/// Evaluates every bundled module against `env`. A module that fails to
/// load is reported to stderr and skipped rather than aborting startup,
/// matching how the REPL driver treats other non-fatal startup warnings.
pub fn load_stdlib(env: &Arc<Environment>) {
    for (name, source) in MODULES {
        if let Err(e) = load_source(source, env) {
            eprintln!("Warning: Failed to load stdlib module {name}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::eval::eval;
    use crate::reader::read_all;

    #[test]
    fn and_or_short_circuit() {
        let env = Environment::new();
        register_builtins(&env);
        load_stdlib(&env);
        let form = read_all("(and 1 2 3)").unwrap().remove(0);
        assert_eq!(eval(&form, &env).unwrap().to_string(), "3");
        let form = read_all("(or #f #f 5)").unwrap().remove(0);
        assert_eq!(eval(&form, &env).unwrap().to_string(), "5");
        let form = read_all("(and #f (error \"never\"))").unwrap().remove(0);
        assert_eq!(eval(&form, &env).unwrap().to_string(), "#f");
    }

    #[test]
    fn when_macro_expands_to_begin() {
        let env = Environment::new();
        register_builtins(&env);
        load_stdlib(&env);
        let form = read_all("(when #t 1 2 3)").unwrap().remove(0);
        assert_eq!(eval(&form, &env).unwrap().to_string(), "3");
    }
}
