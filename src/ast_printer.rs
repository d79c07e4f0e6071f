use std::fmt;

use crate::{
    expr::{Expr, Visitor},
    token::Token,
    value::Value,
};

/// Renders expressions in parenthesized prefix form, e.g. `(* (- 123) (group 45.67))`.
///
/// Debugging aid only; the interpreter never uses it.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut builder = format!("({name}");
        for expr in exprs {
            builder.push(' ');
            builder.push_str(&expr.accept(self));
        }
        builder.push(')');
        builder
    }
}

impl Visitor<String> for AstPrinter {
    fn visit_assign(&mut self, name: &Token, value: &Expr) -> String {
        self.parenthesize(&format!("= {name}"), &[value])
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_grouping(&mut self, expression: &Expr) -> String {
        self.parenthesize("group", &[expression])
    }

    fn visit_literal(&mut self, value: &Value) -> String {
        value.to_string()
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[right])
    }

    fn visit_variable(&mut self, name: &Token) -> String {
        name.lexeme.clone()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AstPrinter.print(self))
    }
}
