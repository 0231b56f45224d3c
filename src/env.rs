// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope. Re-declaration is permitted: a
    /// second `define` of the same name in the same scope simply
    /// replaces the first, it does not walk the parent chain.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up `name` in this scope and, failing that, recursively in
    /// the parent chain — the lookup that gives closures access to
    /// their enclosing variables after the enclosing block exits.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(parent) = &self.parent {
            return parent.get(name);
        }

        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }

    /// Writes to the nearest environment in the chain that already
    /// binds `name`. Presence, not truthiness, decides whether this
    /// scope owns the binding — `assign` must never create one.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings
                .borrow_mut()
                .insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }

        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }
}
