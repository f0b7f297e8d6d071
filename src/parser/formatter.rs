use super::{
    expression::{Expression, ExpressionNode, ExpressionNodeRef, Literal},
    statement::{Program, Statement},
    ParserError,
};
use crate::value::LoxValue;

pub trait ExpressionFormatter {
    fn format(&self, tree: &Expression) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub trait ProgramFormatter {
    fn format_statement(&self, statement: &Statement) -> String;

    fn format_program(&self, program: &Program) -> String {
        let mut buffer = String::new();
        for statement in program.iter() {
            buffer.push_str(&self.format_statement(statement));
            buffer.push('\n');
        }
        buffer
    }
}

pub struct DebugFormatter;

impl ExpressionFormatter for DebugFormatter {
    fn format(&self, tree: &Expression) -> String {
        format!("{tree:?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

impl ProgramFormatter for DebugFormatter {
    fn format_statement(&self, statement: &Statement) -> String {
        format!("{statement:?}")
    }
}

/// Prints syntax trees as fully parenthesised prefix expressions, e.g.
/// `(+ 1.0 (* 2.0 3.0))`.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_literal(literal: &Literal) -> String {
        match literal.value {
            LoxValue::Number(v) => format!("{v:?}"),
            ref value => format!("{value}"),
        }
    }

    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        let current_node = tree
            .get_node(node)
            .expect("Caller should make sure the ref is valid.");

        match current_node {
            ExpressionNode::Literal(literal) => Self::format_literal(literal),
            ExpressionNode::Variable(name) => format!("{name}"),
            ExpressionNode::Group { inner } => {
                format!("(group {})", Self::format_node(tree, *inner))
            }
            ExpressionNode::Prefix { operator, rhs, .. } => {
                format!(
                    "({} {})",
                    operator.symbol(),
                    Self::format_node(tree, *rhs)
                )
            }
            ExpressionNode::Infix {
                operator, lhs, rhs, ..
            } => {
                format!(
                    "({} {} {})",
                    operator.symbol(),
                    Self::format_node(tree, *lhs),
                    Self::format_node(tree, *rhs),
                )
            }
            ExpressionNode::Assignment { lhs, rhs } => {
                format!("(= {} {})", lhs, Self::format_node(tree, *rhs))
            }
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        Self::format_node(tree, tree.get_root_ref())
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("[line {}] {error}", error.line)
    }
}

impl ProgramFormatter for SExpressionFormatter {
    fn format_statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::VariableDecl(decl) => match decl.initial {
                Some(ref initial) => format!("(var {} {})", decl.name, self.format(initial)),
                None => format!("(var {})", decl.name),
            },
            Statement::Expression(stmt) => format!("(expr {})", self.format(&stmt.expr)),
            Statement::Print(stmt) => format!("(print {})", self.format(&stmt.expr)),
            Statement::Block(block) => {
                let mut buffer = String::from("(block");
                for statement in block.body.iter() {
                    buffer.push(' ');
                    buffer.push_str(&self.format_statement(statement));
                }
                buffer.push(')');
                buffer
            }
            Statement::If(stmt) => {
                let condition = self.format(&stmt.condition);
                let success = self.format_statement(&stmt.success);
                match stmt.failure {
                    Some(ref failure) => format!(
                        "(if {condition} {success} {})",
                        self.format_statement(failure)
                    ),
                    None => format!("(if {condition} {success})"),
                }
            }
        }
    }
}
