use super::context::SystemContext;
use super::environment::{Environment, ScopeId};
use crate::parser::{
    expression::{Expression, ExpressionNode, ExpressionNodeRef, InfixOperator, PrefixOperator},
    statement::{
        BlockStatement, ExpressionStatement, IfStatement, PrintStatement, Program, Statement,
        VariableDecl,
    },
};
use crate::value::{
    error::{RuntimeError, RuntimeErrorKind},
    LoxValue,
};
use tracing::debug;

/// Runs programs against a single global scope that persists across calls.
pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: Environment,
    context: C,
    interpreter: TreeWalkStatementInterpreter,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            environment: Environment::new(),
            context,
            interpreter: TreeWalkStatementInterpreter,
        }
    }

    /// Executes the statements in order, stopping at the first runtime error.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let global = self.environment.global();
        for stmt in program.iter() {
            self.interpreter.interpret_statement(
                &mut self.environment,
                global,
                &mut self.context,
                stmt,
            )?;
        }
        Ok(())
    }

    /// Evaluates a standalone expression in the global scope.
    pub fn evaluate(&mut self, expr: &Expression) -> Result<LoxValue, RuntimeError> {
        let global = self.environment.global();
        self.interpreter
            .evaluate(&mut self.environment, global, expr)
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    pub fn get_context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }
}

/// Stateless statement executor. The scope to execute in is passed down
/// explicitly with every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWalkStatementInterpreter;

impl TreeWalkStatementInterpreter {
    pub fn interpret_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        context: &mut C,
        statement: &Statement,
    ) -> Result<(), RuntimeError> {
        match statement {
            Statement::VariableDecl(decl) => {
                self.interpret_variable_declaration(environment, scope, decl)
            }
            Statement::Expression(stmt) => {
                self.interpret_expression_statement(environment, scope, stmt)
            }
            Statement::Print(stmt) => {
                self.interpret_print_statement(environment, scope, context, stmt)
            }
            Statement::Block(stmt) => {
                self.interpret_block_statement(environment, scope, context, stmt)
            }
            Statement::If(stmt) => self.interpret_if_statement(environment, scope, context, stmt),
        }
    }

    pub fn evaluate(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        expr: &Expression,
    ) -> Result<LoxValue, RuntimeError> {
        self.evaluate_expression_node(environment, scope, expr, expr.get_root_ref())
    }
}

// Statement interpreter
impl TreeWalkStatementInterpreter {
    fn interpret_variable_declaration(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        decl: &VariableDecl,
    ) -> Result<(), RuntimeError> {
        let initial = match decl.initial {
            Some(ref expr) => self.evaluate(environment, scope, expr)?,
            None => LoxValue::Nil,
        };
        environment.declare(scope, &decl.name.name, initial);
        Ok(())
    }

    fn interpret_expression_statement(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        stmt: &ExpressionStatement,
    ) -> Result<(), RuntimeError> {
        let _ = self.evaluate(environment, scope, &stmt.expr)?;
        Ok(())
    }

    fn interpret_print_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        context: &mut C,
        stmt: &PrintStatement,
    ) -> Result<(), RuntimeError> {
        let result = self.evaluate(environment, scope, &stmt.expr)?;
        context.writeln(&format!("{result}"));
        Ok(())
    }

    fn interpret_block_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        context: &mut C,
        block: &BlockStatement,
    ) -> Result<(), RuntimeError> {
        let inner = environment.enter_scope(scope);
        debug!(depth = environment.depth(), "entered block");
        let result = block
            .body
            .iter()
            .try_for_each(|stmt| self.interpret_statement(environment, inner, context, stmt));
        // Released on both the success and the error path.
        environment.exit_scope(inner);
        debug!(depth = environment.depth(), "left block");
        result
    }

    fn interpret_if_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        context: &mut C,
        stmt: &IfStatement,
    ) -> Result<(), RuntimeError> {
        if self
            .evaluate(environment, scope, &stmt.condition)?
            .is_truthy()
        {
            self.interpret_statement(environment, scope, context, &stmt.success)
        } else if let Some(ref failure) = stmt.failure {
            self.interpret_statement(environment, scope, context, failure)
        } else {
            Ok(())
        }
    }
}

// Expression evaluator
impl TreeWalkStatementInterpreter {
    fn evaluate_expression_node(
        &self,
        environment: &mut Environment,
        scope: ScopeId,
        expr: &Expression,
        node: ExpressionNodeRef,
    ) -> Result<LoxValue, RuntimeError> {
        const MSG: &str = "[Evaluate]: All node refs are valid.";
        match expr.get_node(node).expect(MSG) {
            ExpressionNode::Literal(literal) => Ok(literal.value.clone()),
            ExpressionNode::Group { inner } => {
                self.evaluate_expression_node(environment, scope, expr, *inner)
            }
            ExpressionNode::Prefix {
                operator,
                rhs,
                span,
            } => {
                let rhs = self.evaluate_expression_node(environment, scope, expr, *rhs)?;
                match operator {
                    PrefixOperator::Bang => Ok(rhs.logical_not()),
                    PrefixOperator::Minus => rhs
                        .numeric_negate()
                        .map_err(|kind| RuntimeError { kind, span: *span }),
                }
            }
            ExpressionNode::Infix {
                operator,
                lhs,
                rhs,
                span,
            } => {
                let lhs = self.evaluate_expression_node(environment, scope, expr, *lhs)?;
                let rhs = self.evaluate_expression_node(environment, scope, expr, *rhs)?;
                let result = match operator {
                    InfixOperator::Add => lhs.add(&rhs),
                    InfixOperator::Subtract => lhs.subtract(&rhs),
                    InfixOperator::Multiply => lhs.multiply(&rhs),
                    InfixOperator::Divide => lhs.divide(&rhs),
                    InfixOperator::LessThan => lhs.less_than(&rhs),
                    InfixOperator::LessThanEqual => lhs.less_than_or_equal(&rhs),
                    InfixOperator::GreaterThan => lhs.greater_than(&rhs),
                    InfixOperator::GreaterThanEqual => lhs.greater_than_or_equal(&rhs),
                    InfixOperator::EqualEqual => Ok(lhs.is_equal(&rhs)),
                    InfixOperator::BangEqual => Ok(lhs.is_not_equal(&rhs)),
                };
                result.map_err(|kind| RuntimeError { kind, span: *span })
            }
            ExpressionNode::Variable(name) => environment
                .access(scope, &name.name)
                .cloned()
                .ok_or_else(|| RuntimeError {
                    kind: RuntimeErrorKind::UndefinedVariable(name.name.clone()),
                    span: name.span,
                }),
            ExpressionNode::Assignment { lhs, rhs } => {
                let value = self.evaluate_expression_node(environment, scope, expr, *rhs)?;
                environment
                    .assign(scope, &lhs.name, value.clone())
                    .map_err(|_| RuntimeError {
                        kind: RuntimeErrorKind::UndefinedVariable(lhs.name.clone()),
                        span: lhs.span,
                    })?;
                Ok(value)
            }
        }
    }
}
