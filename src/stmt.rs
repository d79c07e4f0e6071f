use crate::{expr::Expr, token::Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block {
        statements: Vec<Stmt>,
    },
    Expression {
        expression: Box<Expr>,
    },
    Print {
        expression: Box<Expr>,
    },
    Var {
        name: Token,
        initializer: Option<Box<Expr>>,
    },
}

pub trait Visitor<R> {
    fn visit_block(&mut self, statements: &[Stmt]) -> R;
    fn visit_expression(&mut self, expression: &Expr) -> R;
    fn visit_print(&mut self, expression: &Expr) -> R;
    fn visit_var(&mut self, name: &Token, initializer: Option<&Expr>) -> R;
}

impl Stmt {
    pub fn accept<R, V: Visitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Stmt::Block { statements } => visitor.visit_block(statements),
            Stmt::Expression { expression } => visitor.visit_expression(expression),
            Stmt::Print { expression } => visitor.visit_print(expression),
            Stmt::Var { name, initializer } => visitor.visit_var(name, initializer.as_deref()),
        }
    }
}
