use std::collections::HashMap;

use crate::{error::RuntimeError, token::Token, value::Value};

/// Handle to one scope inside an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvId(usize);

impl EnvId {
    pub const GLOBAL: EnvId = EnvId(0);
}

#[derive(Debug, Default)]
struct Scope {
    values: HashMap<String, Value>,
    enclosing: Option<EnvId>,
}

/// Arena of scopes linked to their enclosing scope by index.
///
/// Scopes are created and released in stack order, so releasing a scope
/// also drops every scope pushed after it. The global scope is never released.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self, enclosing: EnvId) -> EnvId {
        let id = EnvId(self.scopes.len());
        self.scopes.push(Scope {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        });
        tracing::trace!(scope = id.0, enclosing = enclosing.0, "push scope");
        id
    }

    pub fn release(&mut self, id: EnvId) {
        if id == EnvId::GLOBAL {
            return;
        }
        tracing::trace!(scope = id.0, "release scope");
        self.scopes.truncate(id.0);
    }

    /// Number of live scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn define(&mut self, env: EnvId, name: &str, value: Value) {
        self.scopes[env.0].values.insert(name.to_string(), value);
    }

    pub fn get(&self, env: EnvId, name: &Token) -> Result<Value, RuntimeError> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(value) = scope.values.get(&name.lexeme) {
                return Ok(value.to_owned());
            }
            current = scope.enclosing;
        }

        Err(RuntimeError::undefined_variable(name))
    }

    pub fn assign(&mut self, env: EnvId, name: &Token, value: Value) -> Result<Value, RuntimeError> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.0];
            if let Some(slot) = scope.values.get_mut(&name.lexeme) {
                *slot = value.clone();
                return Ok(value);
            }
            current = scope.enclosing;
        }

        Err(RuntimeError::undefined_variable(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
