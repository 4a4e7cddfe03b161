// ABOUTME: Lexically-scoped environment frames shared across threads for `go`

use crate::error::EvalError;
use crate::value::{MacroTransformer, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub struct Environment {
    bindings: RwLock<HashMap<String, Value>>,
    macros: RwLock<HashMap<String, Arc<MacroTransformer>>>,
    parent: Option<Arc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Arc<Self> {
        Arc::new(Environment {
            bindings: RwLock::new(HashMap::new()),
            macros: RwLock::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Arc<Environment>) -> Arc<Self> {
        Arc::new(Environment {
            bindings: RwLock::new(HashMap::new()),
            macros: RwLock::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.write().unwrap().insert(name.into(), value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively.
    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.bindings.read().unwrap().get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(EvalError::Unbound(name.to_string())),
        }
    }

    /// `set!`: mutates the nearest frame that already has this binding.
    /// Unlike `define`, never creates a new binding.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.read().unwrap().contains_key(name) {
            self.bindings.write().unwrap().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(EvalError::Unbound(name.to_string())),
        }
    }

    pub fn define_macro(&self, name: impl Into<String>, transformer: Arc<MacroTransformer>) {
        self.macros.write().unwrap().insert(name.into(), transformer);
    }

    pub fn lookup_macro(&self, name: &str) -> Option<Arc<MacroTransformer>> {
        if let Some(m) = self.macros.read().unwrap().get(name) {
            return Some(Arc::clone(m));
        }
        self.parent.as_ref().and_then(|p| p.lookup_macro(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.lookup("x").unwrap().to_string(), "42");
    }

    #[test]
    fn undefined_symbol_is_error() {
        let env = Environment::new();
        assert!(env.lookup("undefined").is_err());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42.0));
        let child = Environment::with_parent(parent);
        child.define("x", Value::Number(100.0));
        assert_eq!(child.lookup("x").unwrap().to_string(), "100");
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42.0));
        let child = Environment::with_parent(parent);
        assert_eq!(child.lookup("x").unwrap().to_string(), "42");
    }

    #[test]
    fn assign_mutates_defining_frame() {
        let root = Environment::new();
        root.define("x", Value::Number(1.0));
        let child = Environment::with_parent(root.clone());
        child.assign("x", Value::Number(2.0)).unwrap();
        assert_eq!(root.lookup("x").unwrap().to_string(), "2");
        assert!(child.assign("never-defined", Value::Number(0.0)).is_err());
    }

    #[test]
    fn macro_table_is_per_frame_and_inherited() {
        let root = Environment::new();
        let transformer = Arc::new(MacroTransformer {
            literals: vec![],
            rules: vec![],
        });
        root.define_macro("my-macro", transformer);
        let child = Environment::with_parent(root);
        assert!(child.lookup_macro("my-macro").is_some());
        assert!(child.lookup_macro("undefined-macro").is_none());
    }
}
