use std::mem;

use crate::environment::{EnvId, Environment};
use crate::error::RuntimeError;
use crate::expr::{self, Expr};
use crate::print_handler::PrintHandler;
use crate::reporter::Reporter;
use crate::stmt::{self, Stmt};
use crate::token::Token;
use crate::token_type::TokenType;
use crate::value::Value::{self, *};

pub struct Interpreter {
    environment: Environment,
    /// Scope statements currently execute in.
    current: EnvId,
    output: PrintHandler,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(PrintHandler::default())
    }

    pub fn with_output(output: PrintHandler) -> Self {
        Interpreter {
            environment: Environment::new(),
            current: EnvId::GLOBAL,
            output,
        }
    }

    pub fn output(&self) -> &PrintHandler {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut PrintHandler {
        &mut self.output
    }

    /// Runs `statements` in order, stopping at the first runtime error.
    ///
    /// The error goes to `reporter`; the return value says whether one occurred.
    /// Globals survive between calls.
    #[tracing::instrument(level = "trace", skip_all, fields(count = statements.len()))]
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &mut dyn Reporter) -> bool {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                tracing::debug!(line = error.line(), %error, "aborting batch");
                reporter.runtime_error(&error);
                return true;
            }
        }
        false
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.accept(self)
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), RuntimeError> {
        statement.accept(self)
    }

    /// Executes `statements` with `environment` as the current scope, then
    /// restores the previous scope and releases `environment`, on failure too.
    #[tracing::instrument(level = "trace", skip_all)]
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: EnvId,
    ) -> Result<(), RuntimeError> {
        let previous = mem::replace(&mut self.current, environment);
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.current = previous;
        self.environment.release(environment);
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl stmt::Visitor<Result<(), RuntimeError>> for Interpreter {
    fn visit_block(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        let environment = self.environment.push(self.current);
        self.execute_block(statements, environment)
    }

    fn visit_expression(&mut self, expression: &Expr) -> Result<(), RuntimeError> {
        self.evaluate(expression)?;
        Ok(())
    }

    fn visit_print(&mut self, expression: &Expr) -> Result<(), RuntimeError> {
        let value = self.evaluate(expression)?;
        self.output.println(&value.to_string());
        Ok(())
    }

    fn visit_var(&mut self, name: &Token, initializer: Option<&Expr>) -> Result<(), RuntimeError> {
        let value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            _ => Nil,
        };
        self.environment.define(self.current, &name.lexeme, value);
        Ok(())
    }
}

impl expr::Visitor<Result<Value, RuntimeError>> for Interpreter {
    fn visit_assign(&mut self, name: &Token, value: &Expr) -> Result<Value, RuntimeError> {
        let value = self.evaluate(value)?;
        self.environment.assign(self.current, name, value)
    }

    fn visit_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.typ {
            TokenType::Plus => match (left, right) {
                (Number(n1), Number(n2)) => Ok(Number(n1 + n2)),
                (Str(s1), Str(s2)) => Ok(Str(s1 + &s2)),
                _ => Err(RuntimeError::type_error(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::Minus => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Number(left - right))
            }
            TokenType::Slash => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Number(left / right))
            }
            TokenType::Star => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Number(left * right))
            }
            TokenType::Greater => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Bool(left > right))
            }
            TokenType::GreaterEqual => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Bool(left >= right))
            }
            TokenType::Less => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Bool(left < right))
            }
            TokenType::LessEqual => {
                let (left, right) = get_numeric_operands(operator, &left, &right)?;
                Ok(Bool(left <= right))
            }
            TokenType::BangEqual => Ok(Bool(left != right)),
            TokenType::EqualEqual => Ok(Bool(left == right)),
            _ => Err(RuntimeError::type_error(
                operator,
                "Expected a binary operator.",
            )),
        }
    }

    fn visit_grouping(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        self.evaluate(expression)
    }

    fn visit_literal(&mut self, value: &Value) -> Result<Value, RuntimeError> {
        Ok(value.clone())
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match operator.typ {
            TokenType::Bang => Ok(Bool(!right.is_truthy())),
            TokenType::Minus => match right {
                Number(value) => Ok(Number(-value)),
                _ => Err(RuntimeError::type_error(
                    operator,
                    "Operand must be a number.",
                )),
            },
            _ => Err(RuntimeError::type_error(operator, "Expected a unary operator.")),
        }
    }

    fn visit_variable(&mut self, name: &Token) -> Result<Value, RuntimeError> {
        self.environment.get(self.current, name)
    }
}

fn get_numeric_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Number(left), Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeError::type_error(
            operator,
            "Operands must be numbers.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct Collect(Vec<RuntimeError>);

    impl Reporter for Collect {
        fn error(&mut self, _line: usize, _location: &str, _message: &str) {}

        fn runtime_error(&mut self, error: &RuntimeError) {
            self.0.push(error.clone());
        }
    }

    fn token(typ: TokenType, lexeme: &str) -> Token {
        Token::new(typ, lexeme, Nil, 1)
    }

    fn binary(left: Expr, typ: TokenType, lexeme: &str, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            operator: token(typ, lexeme),
            right: Box::new(right),
        }
    }

    fn unary(typ: TokenType, lexeme: &str, right: Expr) -> Expr {
        Expr::Unary {
            operator: token(typ, lexeme),
            right: Box::new(right),
        }
    }

    fn variable(name: &str) -> Expr {
        Expr::Variable {
            name: token(TokenType::Identifier, name),
        }
    }

    fn assign(name: &str, value: Expr) -> Expr {
        Expr::Assign {
            name: token(TokenType::Identifier, name),
            value: Box::new(value),
        }
    }

    fn var(name: &str, initializer: Option<Expr>) -> Stmt {
        Stmt::Var {
            name: token(TokenType::Identifier, name),
            initializer: initializer.map(Box::new),
        }
    }

    fn print(expression: Expr) -> Stmt {
        Stmt::Print {
            expression: Box::new(expression),
        }
    }

    fn expression(expression: Expr) -> Stmt {
        Stmt::Expression {
            expression: Box::new(expression),
        }
    }

    fn eval(expr: &Expr) -> Result<Value, RuntimeError> {
        Interpreter::with_output(PrintHandler::buffer()).evaluate(expr)
    }

    fn run(statements: &[Stmt]) -> (String, Vec<RuntimeError>, Interpreter) {
        let mut interpreter = Interpreter::with_output(PrintHandler::buffer());
        let mut reporter = Collect::default();
        interpreter.interpret(statements, &mut reporter);
        (interpreter.output().output().to_owned(), reporter.0, interpreter)
    }

    #[test]
    fn arithmetic() {
        let expr = binary(
            binary(Expr::literal(6.0), TokenType::Star, "*", Expr::literal(7.0)),
            TokenType::Minus,
            "-",
            binary(Expr::literal(10.0), TokenType::Slash, "/", Expr::literal(4.0)),
        );
        assert_eq!(eval(&expr), Ok(Number(39.5)));
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        let expr = binary(Expr::literal(1.0), TokenType::Slash, "/", Expr::literal(0.0));
        assert_eq!(eval(&expr), Ok(Number(f64::INFINITY)));

        let expr = binary(Expr::literal(0.0), TokenType::Slash, "/", Expr::literal(0.0));
        assert!(matches!(eval(&expr), Ok(Number(n)) if n.is_nan()));
    }

    #[test]
    fn plus_concatenates_strings() {
        let expr = binary(Expr::literal("2"), TokenType::Plus, "+", Expr::literal("2"));
        assert_eq!(eval(&expr), Ok(Str("22".to_owned())));
    }

    #[test]
    fn plus_rejects_mixed_operands() {
        let expr = binary(Expr::literal(1.0), TokenType::Plus, "+", Expr::literal("a"));
        let error = eval(&expr).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Operands must be two numbers or two strings."
        );
        assert_eq!(error.token().typ, TokenType::Plus);
    }

    #[test]
    fn comparison_requires_numbers() {
        let expr = binary(Expr::literal(1.0), TokenType::Less, "<", Expr::literal(true));
        assert_eq!(eval(&expr).unwrap_err().to_string(), "Operands must be numbers.");

        let expr = binary(Expr::literal(1.0), TokenType::LessEqual, "<=", Expr::literal(1.0));
        assert_eq!(eval(&expr), Ok(Bool(true)));

        let expr = binary(Expr::literal(3.0), TokenType::Greater, ">", Expr::literal(4.0));
        assert_eq!(eval(&expr), Ok(Bool(false)));
    }

    #[test]
    fn equality_never_fails() {
        let nil = || Expr::literal(Nil);
        let cases = [
            (nil(), nil(), true),
            (nil(), Expr::literal(false), false),
            (Expr::literal(1.0), Expr::literal("1"), false),
            (Expr::literal("a"), Expr::literal("a"), true),
            (Expr::literal(true), Expr::literal(true), true),
        ];
        for (left, right, expected) in cases {
            let eq = binary(left.clone(), TokenType::EqualEqual, "==", right.clone());
            assert_eq!(eval(&eq), Ok(Bool(expected)));
            let ne = binary(left, TokenType::BangEqual, "!=", right);
            assert_eq!(eval(&ne), Ok(Bool(!expected)));
        }
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            eval(&unary(TokenType::Bang, "!", Expr::literal(Nil))),
            Ok(Bool(true))
        );
        assert_eq!(
            eval(&unary(TokenType::Bang, "!", Expr::literal(0.0))),
            Ok(Bool(false))
        );
        assert_eq!(
            eval(&unary(TokenType::Minus, "-", Expr::literal(2.5))),
            Ok(Number(-2.5))
        );
        assert_eq!(
            eval(&unary(TokenType::Minus, "-", Expr::literal("x")))
                .unwrap_err()
                .to_string(),
            "Operand must be a number."
        );
    }

    #[test]
    fn unknown_operator_is_a_type_error() {
        let expr = binary(Expr::literal(1.0), TokenType::Comma, ",", Expr::literal(2.0));
        assert_eq!(
            eval(&expr).unwrap_err().to_string(),
            "Expected a binary operator."
        );

        let expr = unary(TokenType::Plus, "+", Expr::literal(1.0));
        assert_eq!(
            eval(&expr).unwrap_err().to_string(),
            "Expected a unary operator."
        );
    }

    #[test]
    fn stringify_on_print() {
        let (output, errors, _) = run(&[
            print(Expr::literal(3.0)),
            print(Expr::literal(3.5)),
            print(Expr::literal(Nil)),
            print(Expr::literal(true)),
            print(Expr::literal("text")),
        ]);
        assert_eq!(output, "3\n3.5\nnil\ntrue\ntext\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn var_without_initializer_is_nil() {
        let (output, _, _) = run(&[var("a", None), print(variable("a"))]);
        assert_eq!(output, "nil\n");
    }

    #[test]
    fn block_shadowing_is_restored() {
        let (output, errors, _) = run(&[
            var("x", Some(Expr::literal(1.0))),
            Stmt::Block {
                statements: vec![var("x", Some(Expr::literal(2.0))), print(variable("x"))],
            },
            print(variable("x")),
        ]);
        assert_eq!(output, "2\n1\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn assignment_in_block_updates_outer_binding() {
        let (output, _, _) = run(&[
            var("x", Some(Expr::literal(1.0))),
            Stmt::Block {
                statements: vec![expression(assign("x", Expr::literal(2.0)))],
            },
            print(variable("x")),
        ]);
        assert_eq!(output, "2\n");
    }

    #[test]
    fn assignment_is_an_expression() {
        let (output, _, _) = run(&[
            var("a", None),
            var("b", None),
            print(assign("a", assign("b", Expr::literal(4.0)))),
            print(variable("b")),
        ]);
        assert_eq!(output, "4\n4\n");
    }

    #[test]
    fn undefined_assignment_fails() {
        let (_, errors, mut interpreter) = run(&[expression(assign("y", Expr::literal(1.0)))]);
        assert_eq!(
            errors,
            vec![RuntimeError::undefined_variable(&token(
                TokenType::Identifier,
                "y"
            ))]
        );
        assert!(interpreter.evaluate(&variable("y")).is_err());
    }

    #[test]
    fn block_declarations_do_not_leak() {
        let (_, errors, _) = run(&[
            Stmt::Block {
                statements: vec![var("inner", Some(Expr::literal(1.0)))],
            },
            print(variable("inner")),
        ]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Undefined variable 'inner'.");
    }

    #[test]
    fn failure_aborts_batch_once() {
        let failing = unary(TokenType::Minus, "-", Expr::literal("oops"));
        let (output, errors, _) = run(&[
            print(Expr::literal(1.0)),
            expression(failing),
            print(Expr::literal(2.0)),
        ]);
        assert_eq!(output, "1\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn nested_block_failure_restores_scope() {
        let (output, errors, mut interpreter) = run(&[
            var("x", Some(Expr::literal("global"))),
            Stmt::Block {
                statements: vec![
                    var("x", Some(Expr::literal("outer"))),
                    Stmt::Block {
                        statements: vec![
                            var("x", Some(Expr::literal("inner"))),
                            expression(variable("missing")),
                        ],
                    },
                ],
            },
        ]);
        assert_eq!(output, "");
        assert_eq!(errors.len(), 1);
        assert_eq!(interpreter.current, EnvId::GLOBAL);
        assert_eq!(interpreter.environment.depth(), 1);

        let mut reporter = Collect::default();
        interpreter.interpret(&[print(variable("x"))], &mut reporter);
        assert_eq!(interpreter.output().output(), "global\n");
        assert!(reporter.0.is_empty());
    }

    #[test]
    fn globals_persist_across_batches() {
        let mut interpreter = Interpreter::with_output(PrintHandler::buffer());
        let mut reporter = Collect::default();
        assert!(!interpreter.interpret(&[var("a", Some(Expr::literal(1.0)))], &mut reporter));
        assert!(!interpreter.interpret(&[print(variable("a"))], &mut reporter));
        assert_eq!(interpreter.output().output(), "1\n");
    }

    fn literal_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Nil),
            any::<bool>().prop_map(Bool),
            any::<f64>()
                .prop_filter("NaN is unequal to itself", |n| !n.is_nan())
                .prop_map(Number),
            ".*".prop_map(Str),
        ]
    }

    proptest! {
        #[test]
        fn literal_evaluates_to_itself(value in literal_value()) {
            prop_assert_eq!(eval(&Expr::literal(value.clone())), Ok(value));
        }

        #[test]
        fn grouping_is_transparent(value in literal_value(), negate in any::<bool>()) {
            let inner = if negate {
                unary(TokenType::Bang, "!", Expr::literal(value))
            } else {
                Expr::literal(value)
            };
            let grouped = Expr::Grouping { expression: Box::new(inner.clone()) };
            prop_assert_eq!(eval(&grouped), eval(&inner));
        }

        #[test]
        fn numeric_plus_and_minus(a in -1e9f64..1e9, b in -1e9f64..1e9) {
            let sum = binary(Expr::literal(a), TokenType::Plus, "+", Expr::literal(b));
            prop_assert_eq!(eval(&sum), Ok(Number(a + b)));
            let difference = binary(Expr::literal(a), TokenType::Minus, "-", Expr::literal(b));
            prop_assert_eq!(eval(&difference), Ok(Number(a - b)));
        }
    }
}
