use super::expression::Expression;
use crate::string::Ident;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDecl(VariableDecl),
    Expression(ExpressionStatement),
    Print(PrintStatement),
    Block(BlockStatement),
    If(IfStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: Ident,
    pub initial: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatement {
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub success: Box<Statement>,
    pub failure: Option<Box<Statement>>,
}

/// The top-level statements of a source text, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn get_statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}
