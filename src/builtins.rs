// ABOUTME: Native functions installed into the global environment

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::{Callable, Value};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Registers every native builtin into `globals`.
pub fn register(globals: &Rc<Environment>) {
    globals.define(
        "clock".to_string(),
        Value::Callable(Callable::Native {
            name: "clock",
            arity: 0,
            func: clock,
        }),
    );
}

fn clock(_args: &[Value]) -> Result<Value, RuntimeError> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_secs_f64();
    Ok(Value::Number(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Token, TokenKind};

    #[test]
    fn clock_is_registered_as_a_zero_arity_native() {
        let globals = Environment::new();
        register(&globals);

        let name = Token::new(TokenKind::Identifier, "clock", Literal::Nil, 1);
        match globals.get(&name) {
            Ok(Value::Callable(callable)) => assert_eq!(callable.arity(), 0),
            _ => panic!("expected clock to be registered as a callable"),
        }
    }

    #[test]
    fn clock_returns_a_positive_number() {
        match clock(&[]) {
            Ok(Value::Number(n)) => assert!(n > 0.0),
            _ => panic!("expected clock() to return a positive Number"),
        }
    }
}
