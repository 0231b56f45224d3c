// ABOUTME: Runtime value types produced by evaluating Lox expressions

use crate::ast::FunctionDecl;
use crate::env::Environment;
use crate::error::RuntimeError;
use std::fmt;
use std::rc::Rc;

/// The tagged runtime value. Equality and truthiness are defined on
/// this type in `interpreter.rs`, not via `derive`, since Lox's rules
/// (no coercion across tags, `nil == nil` but `nil != false`) don't
/// match what `PartialEq` would derive for the `Callable` variant.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Callable(Callable),
}

impl Value {
    /// Exactly `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.2e18 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::Callable(c) => write!(f, "{c}"),
        }
    }
}

/// A callable value: either a native (built-in) function or a
/// user-declared function paired with the environment captured at its
/// declaration site (its closure).
#[derive(Clone)]
pub enum Callable {
    Native {
        name: &'static str,
        arity: usize,
        func: fn(&[Value]) -> Result<Value, RuntimeError>,
    },
    Function(Rc<LoxFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native { arity, .. } => *arity,
            Callable::Function(f) => f.declaration.params.len(),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native { name, .. } => write!(f, "<built-in function {name}>"),
            Callable::Function(func) => write!(f, "<function {}>", func.declaration.name.lexeme),
        }
    }
}

/// A user-declared function: its AST plus the environment active when
/// `fun` ran. Co-owning that environment (via `Rc`) is what makes
/// closures work after the declaring block has exited.
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<Environment>,
}
