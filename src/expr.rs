use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Grouping {
        expression: Box<Expr>,
    },
    LiteralExpr {
        value: Value,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
}

/// One traversal over expressions, one method per variant.
///
/// Implementors must handle every variant; `Expr::accept` picks the method.
pub trait Visitor<R> {
    fn visit_assign(&mut self, name: &Token, value: &Expr) -> R;
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> R;
    fn visit_grouping(&mut self, expression: &Expr) -> R;
    fn visit_literal(&mut self, value: &Value) -> R;
    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> R;
    fn visit_variable(&mut self, name: &Token) -> R;
}

impl Expr {
    pub fn accept<R, V: Visitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Expr::Assign { name, value } => visitor.visit_assign(name, value),
            Expr::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(left, operator, right),
            Expr::Grouping { expression } => visitor.visit_grouping(expression),
            Expr::LiteralExpr { value } => visitor.visit_literal(value),
            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),
            Expr::Variable { name } => visitor.visit_variable(name),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::LiteralExpr {
            value: value.into(),
        }
    }
}
