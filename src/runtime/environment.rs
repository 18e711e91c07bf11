use std::collections::HashMap;

use crate::runtime::runtime_error::{undefined_variable, RuntimeError};

/// Variable bindings as a chain of scopes.
///
/// The last scope is the innermost. The outermost (global) scope always
/// exists, so `define` always has somewhere to write.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<HashMap<String, i64>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Inserts or overwrites `name` in the innermost scope only.
    pub fn define(&mut self, name: &str, value: i64) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Reads `name`, searching from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Result<i64, RuntimeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .ok_or_else(|| undefined_variable(name, None))
    }

    /// Overwrites the nearest existing binding of `name`. Never creates one.
    pub fn assign(&mut self, name: &str, value: i64) -> Result<(), RuntimeError> {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined_variable(name, None)),
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drops the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Visible bindings sorted by name, inner scopes shadowing outer ones.
    pub fn bindings(&self) -> Vec<(String, i64)> {
        let mut visible: HashMap<&str, i64> = HashMap::new();
        for scope in &self.scopes {
            for (name, value) in scope {
                visible.insert(name.as_str(), *value);
            }
        }
        let mut out: Vec<(String, i64)> = visible
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        out.sort();
        out
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let mut env = Environment::new();
        env.define("x", 5);
        assert_eq!(env.lookup("x").unwrap(), 5);
    }

    #[test]
    fn test_define_overwrites() {
        let mut env = Environment::new();
        env.define("x", 5);
        env.define("x", 6);
        assert_eq!(env.lookup("x").unwrap(), 6);
    }

    #[test]
    fn test_lookup_undefined() {
        let env = Environment::new();
        let err = env.lookup("nope").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_assign_never_creates() {
        let mut env = Environment::new();
        assert!(env.assign("x", 1).is_err());
        assert!(env.lookup("x").is_err());
    }

    #[test]
    fn test_lookup_walks_outward() {
        let mut env = Environment::new();
        env.define("outer", 1);
        env.push_scope();
        env.define("inner", 2);
        assert_eq!(env.lookup("outer").unwrap(), 1);
        assert_eq!(env.lookup("inner").unwrap(), 2);
        env.pop_scope();
        assert!(env.lookup("inner").is_err());
    }

    #[test]
    fn test_assign_mutates_scope_where_found() {
        let mut env = Environment::new();
        env.define("x", 1);
        env.push_scope();
        env.assign("x", 10).unwrap();
        env.pop_scope();
        assert_eq!(env.lookup("x").unwrap(), 10);
    }

    #[test]
    fn test_shadowing_in_inner_scope() {
        let mut env = Environment::new();
        env.define("x", 1);
        env.push_scope();
        env.define("x", 2);
        env.assign("x", 3).unwrap();
        assert_eq!(env.lookup("x").unwrap(), 3);
        assert_eq!(env.bindings(), vec![("x".to_string(), 3)]);
        env.pop_scope();
        assert_eq!(env.lookup("x").unwrap(), 1);
    }

    #[test]
    fn test_global_scope_survives_pop() {
        let mut env = Environment::new();
        env.define("g", 7);
        env.pop_scope();
        env.pop_scope();
        assert_eq!(env.lookup("g").unwrap(), 7);
    }

    #[test]
    fn test_bindings_sorted() {
        let mut env = Environment::new();
        env.define("b", 2);
        env.define("a", 1);
        env.define("c", 3);
        let names: Vec<String> = env.bindings().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_many_bindings() {
        let mut env = Environment::new();
        for i in 0..1000 {
            env.define(&format!("v{}", i), i);
        }
        assert_eq!(env.lookup("v999").unwrap(), 999);
    }
}
