// ABOUTME: Tree-walking interpreter: executes statements and evaluates
// ABOUTME: expressions against the current environment

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::builtins;
use crate::diagnostics::Diagnostics;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::{Callable, LoxFunction, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Distinguishes a statement sequence running to completion from one
/// that hit a `return`. `return` is not an error: it is the `Ok` side
/// of every statement-execution result, and only a function's call
/// frame interprets `Flow::Return` specially.
pub enum Flow {
    Normal,
    Return(Value),
}

pub type ExecResult = Result<Flow, RuntimeError>;

pub struct Interpreter {
    globals: Rc<Environment>,
    environment: RefCell<Rc<Environment>>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        builtins::register(&globals);
        Interpreter {
            globals: globals.clone(),
            environment: RefCell::new(globals),
        }
    }

    /// Runs a whole program, reporting the first runtime error (if any)
    /// to `diagnostics` and stopping there, matching jlox's top-level
    /// `interpret` behavior.
    pub fn interpret(&self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                diagnostics.runtime_error(&error);
                return;
            }
        }
    }

    fn execute(&self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(Flow::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment
                    .borrow()
                    .define(name.lexeme.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Block(statements) => {
                let enclosing = self.environment.borrow().clone();
                let scope = Environment::with_parent(enclosing);
                self.execute_block(statements, scope)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(decl) => {
                let function = Value::Callable(Callable::Function(Rc::new(LoxFunction {
                    declaration: decl.clone(),
                    closure: self.environment.borrow().clone(),
                })));
                self.environment
                    .borrow()
                    .define(decl.name.lexeme.clone(), function);
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs `statements` in `scope`, guaranteeing the previously-current
    /// environment is restored on every exit path (normal completion,
    /// early `return`, or a propagated runtime error).
    fn execute_block(&self, statements: &[Stmt], scope: Rc<Environment>) -> ExecResult {
        let previous = self.environment.replace(scope);
        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Flow::Normal => {}
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            }
            Ok(Flow::Normal)
        })();
        self.environment.replace(previous);
        result
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),
            Expr::Variable(name) => self.environment.borrow().get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.borrow().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
        }
    }

    fn evaluate_unary(&self, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(
                    operator.clone(),
                    "Operand must be a number.",
                )),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("parser only produces '-' and '!' as unary operators"),
        }
    }

    fn evaluate_logical(
        &self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;

        match operator.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::Or => self.evaluate(right),
            TokenKind::And if !left.is_truthy() => Ok(left),
            TokenKind::And => self.evaluate(right),
            _ => unreachable!("parser only produces 'or' and 'and' as logical operators"),
        }
    }

    fn evaluate_binary(
        &self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match operator.kind {
            Minus => Ok(Value::Number(number_operand(operator, &left)? - number_operand(operator, &right)?)),
            Slash => Ok(Value::Number(number_operand(operator, &left)? / number_operand(operator, &right)?)),
            Star => Ok(Value::Number(number_operand(operator, &left)? * number_operand(operator, &right)?)),
            Percent => Ok(Value::Number(number_operand(operator, &left)? % number_operand(operator, &right)?)),
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                _ => Err(RuntimeError::new(
                    operator.clone(),
                    "Operands must be two numbers or two strings.",
                )),
            },
            Greater => Ok(Value::Bool(
                number_operand(operator, &left)? > number_operand(operator, &right)?,
            )),
            GreaterEqual => Ok(Value::Bool(
                number_operand(operator, &left)? >= number_operand(operator, &right)?,
            )),
            Less => Ok(Value::Bool(
                number_operand(operator, &left)? < number_operand(operator, &right)?,
            )),
            LessEqual => Ok(Value::Bool(
                number_operand(operator, &left)? <= number_operand(operator, &right)?,
            )),
            BangEqual => Ok(Value::Bool(!values_equal(&left, &right))),
            EqualEqual => Ok(Value::Bool(values_equal(&left, &right))),
            _ => unreachable!("parser only produces comparable/arithmetic operators here"),
        }
    }

    fn evaluate_call(
        &self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        let callable = match callee {
            Value::Callable(callable) => callable,
            _ => {
                return Err(RuntimeError::new(
                    paren.clone(),
                    "Can only call functions and classes.",
                ))
            }
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren.clone(),
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    args.len()
                ),
            ));
        }

        self.call(&callable, &args)
    }

    fn call(&self, callable: &Callable, args: &[Value]) -> Result<Value, RuntimeError> {
        match callable {
            Callable::Native { func, .. } => func(args),
            Callable::Function(function) => self.call_function(function, args),
        }
    }

    fn call_function(&self, function: &LoxFunction, args: &[Value]) -> Result<Value, RuntimeError> {
        let scope = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.declaration.params.iter().zip(args) {
            scope.define(param.lexeme.clone(), arg.clone());
        }

        match self.execute_block(&function.declaration.body, scope)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn number_operand(operator: &Token, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::new(
            operator.clone(),
            "Operand must be a number.",
        )),
    }
}

/// Tag-and-value equality with no coercion across types. `nil == nil`
/// is true; `nil == false` is false, since they carry different tags.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Callable(_), Value::Callable(_)) => false,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn run(src: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(src, &mut diagnostics).scan_tokens();
        let statements: Vec<Stmt> = Parser::new(tokens, &mut diagnostics)
            .parse()
            .into_iter()
            .flatten()
            .collect();
        assert!(!diagnostics.had_syntax_error, "unexpected syntax error");

        let interpreter = Interpreter::new();
        interpreter.interpret(&statements, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn arithmetic_runs_without_error() {
        let diagnostics = run("print 1 + 2 * 3;");
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn string_concatenation_requires_both_strings() {
        let diagnostics = run("print \"a\" + \"b\";");
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn adding_number_and_string_is_a_runtime_error() {
        let diagnostics = run("print 1 + \"a\";");
        assert!(diagnostics.had_runtime_error);
    }

    #[test]
    fn block_scoping_does_not_leak_shadow_outward() {
        let diagnostics = run(
            "var x = 1;
             { var x = 2; }
             print x;",
        );
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let diagnostics = run(
            "fun makeCounter() {
                 var count = 0;
                 fun counter() {
                     count = count + 1;
                     return count;
                 }
                 return counter;
             }
             var counter = makeCounter();
             counter();
             counter();",
        );
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn for_loop_runs_to_completion() {
        let diagnostics = run("for (var i = 0; i < 5; i = i + 1) print i;");
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn calling_a_non_callable_is_a_runtime_error() {
        let diagnostics = run("var x = 1; x();");
        assert!(diagnostics.had_runtime_error);
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        let diagnostics = run("fun f(a, b) { return a + b; } f(1);");
        assert!(diagnostics.had_runtime_error);
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let diagnostics = run("print missing;");
        assert!(diagnostics.had_runtime_error);
    }

    #[test]
    fn modulo_operates_on_numbers() {
        let diagnostics = run("print 7 % 3;");
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn nil_equals_nil_but_not_false() {
        let diagnostics = run(
            "if (nil == nil) { print \"ok\"; }
             if (nil == false) { print \"bad\"; }",
        );
        assert!(!diagnostics.had_runtime_error);
    }

    #[test]
    fn short_circuit_or_does_not_evaluate_right_when_left_truthy() {
        let diagnostics = run("print true or (1 + \"x\" == 1);");
        // `or` short-circuits, so the erroring right side never runs.
        assert!(!diagnostics.had_runtime_error);
    }
}
