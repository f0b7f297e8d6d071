mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

pub use error::{ErrorLocation, ParserError, ParserErrorKind};
use expression::{
    Expression, ExpressionNode, ExpressionNodeRef, IncompleteExpression, InfixOperator, Literal,
    PrefixOperator,
};
use statement::{
    BlockStatement, ExpressionStatement, IfStatement, PrintStatement, Program, Statement,
    VariableDecl,
};
use tracing::debug;

use crate::{
    lexer::{Span, Token, TokenKind},
    string::Ident,
    value::LoxValue,
};

/// Result of parsing a whole token stream.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    /// Every top-level declaration that parsed cleanly.
    pub program: Program,
    /// One error per top-level declaration that was abandoned.
    pub errors: Vec<ParserError>,
}

type NodeResult = Result<ExpressionNodeRef, ParserError>;

/// Deepest nesting of groups, unary operators, operator chains and
/// statements accepted before parsing gives up.
pub const MAX_NESTING: u32 = 256;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// An error that does not stop the current declaration from parsing but
    /// still causes it to be dropped.
    deferred: Option<ParserError>,
    nesting: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let (line, end) = tokens
                .last()
                .map(|t| (t.line, t.span.end()))
                .unwrap_or((1, 0));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: "".into(),
                literal: None,
                line,
                span: Span::new(end, 0),
            });
        }
        Self {
            tokens,
            current: 0,
            deferred: None,
            nesting: 0,
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn next_token(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn eat_if(&mut self, next: TokenKind) -> Option<Token> {
        if self.check(next) {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn eat_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek().kind) {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn expect(&mut self, expected: TokenKind, context: &'static str) -> Result<Token, ParserError> {
        self.eat_if(expected).ok_or_else(|| {
            ParserError::at_token(
                self.peek(),
                ParserErrorKind::MissingToken { expected, context },
            )
        })
    }

    fn enter_nesting(&mut self) -> Result<(), ParserError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParserError::at_token(
                self.peek(),
                ParserErrorKind::TooDeeplyNested,
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        let outer = self.nesting;
        self.enter_nesting()?;
        let result = parse(self);
        self.nesting = outer;
        result
    }

    /// Drops the remainder of a failed declaration that began at token `start`.
    ///
    /// Stops after the `;` that ends it at brace depth zero, after the `}`
    /// closing the outermost brace it opened, or at `Eof`. A following `else`
    /// is dropped along with its branch.
    fn skip_declaration(&mut self, start: usize) {
        let mut depth = self.tokens[start..self.current]
            .iter()
            .fold(0u32, |depth, token| match token.kind {
                TokenKind::LeftBrace => depth + 1,
                TokenKind::RightBrace => depth.saturating_sub(1),
                _ => depth,
            });
        while !self.is_at_end() {
            let ends_statement = match self.next_token().kind {
                TokenKind::LeftBrace => {
                    depth += 1;
                    false
                }
                TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                    depth == 0
                }
                TokenKind::Semicolon => depth == 0,
                _ => false,
            };
            // An `else` still belongs to the failed `if`.
            if ends_statement && self.eat_if(TokenKind::KeywordElse).is_none() {
                break;
            }
        }
    }
}

// Parse program/statements
impl Parser {
    /// Parses every remaining declaration.
    ///
    /// A failed declaration is dropped as a whole and its error recorded;
    /// parsing then carries on with the next declaration.
    pub fn parse(mut self) -> ParsedProgram {
        let mut statements = Vec::new();
        let mut errors = Vec::new();
        while let Some(result) = self.parse_declaration() {
            match result {
                Ok(statement) => statements.push(statement),
                Err(error) => errors.push(error),
            }
        }
        ParsedProgram {
            program: Program::new(statements),
            errors,
        }
    }

    /// Parses one top-level declaration, or returns `None` at the end of input.
    pub fn parse_declaration(&mut self) -> Option<Result<Statement, ParserError>> {
        if self.is_at_end() {
            return None;
        }
        let start = self.current;
        self.nesting = 0;
        let result = self.declaration();
        if result.is_err() {
            self.skip_declaration(start);
        }
        // The earliest error in the declaration is the one reported.
        let result = match self.deferred.take() {
            Some(deferred) => Err(deferred),
            None => result,
        };
        match result {
            Ok(ref statement) => {
                debug!(kind = statement_kind(statement), "parsed declaration");
            }
            Err(ref error) => {
                debug!(line = error.line, %error, "abandoned declaration");
            }
        }
        Some(result)
    }

    fn declaration(&mut self) -> Result<Statement, ParserError> {
        if self.eat_if(TokenKind::KeywordVar).is_some() {
            self.variable_declaration()
        } else {
            self.statement()
        }
    }

    fn variable_declaration(&mut self) -> Result<Statement, ParserError> {
        let name = match self.eat_if(TokenKind::Ident) {
            Some(token) => Ident {
                name: token.lexeme,
                span: token.span,
            },
            None => {
                return Err(ParserError::at_token(
                    self.peek(),
                    ParserErrorKind::ExpectedVariableName,
                ))
            }
        };

        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "after variable declaration")?;

        Ok(Statement::VariableDecl(VariableDecl { name, initial }))
    }

    fn statement(&mut self) -> Result<Statement, ParserError> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> Result<Statement, ParserError> {
        match self.peek().kind {
            TokenKind::KeywordPrint => {
                self.next_token();
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon, "after value")?;
                Ok(Statement::Print(PrintStatement { expr }))
            }
            TokenKind::LeftBrace => {
                self.next_token();
                let mut body = Vec::new();
                while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                    body.push(self.declaration()?);
                }
                self.expect(TokenKind::RightBrace, "after block")?;
                Ok(Statement::Block(BlockStatement { body }))
            }
            TokenKind::KeywordIf => {
                self.next_token();
                self.expect(TokenKind::LeftParenthesis, "after 'if'")?;
                let condition = self.expression()?;
                self.expect(TokenKind::RightParenthesis, "after if condition")?;
                let success = Box::new(self.statement()?);
                let failure = match self.eat_if(TokenKind::KeywordElse) {
                    Some(_) => Some(Box::new(self.statement()?)),
                    None => None,
                };
                Ok(Statement::If(IfStatement {
                    condition,
                    success,
                    failure,
                }))
            }
            _ => {
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon, "after expression")?;
                Ok(Statement::Expression(ExpressionStatement { expr }))
            }
        }
    }
}

// Recursive descent for expressions, one method per precedence level.
impl Parser {
    /// Parses a single expression on its own, e.g. for printing its tree.
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let expr = self.expression();
        match self.deferred.take() {
            Some(deferred) => Err(deferred),
            None => expr,
        }
    }

    fn expression(&mut self) -> Result<Expression, ParserError> {
        let mut tree = IncompleteExpression::new();
        let root = self.assignment(&mut tree)?;
        Ok(Expression::new(tree, root)
            .expect("Root was obtained from the tree itself so it must be valid."))
    }

    fn assignment(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        self.nested(|parser| parser.assignment_inner(tree))
    }

    fn assignment_inner(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        let lhs = self.equality(tree)?;
        let Some(equals) = self.eat_if(TokenKind::Equal) else {
            return Ok(lhs);
        };
        // Right associative: `a = b = c` assigns `c` to `b` first.
        let rhs = self.assignment(tree)?;
        match tree.get_node(lhs).and_then(ExpressionNode::get_l_value) {
            Some(name) => Ok(tree.push(ExpressionNode::Assignment { lhs: name, rhs })),
            None => {
                // Keep parsing so the rest of the statement is consumed.
                self.deferred.get_or_insert(ParserError::at_token(
                    &equals,
                    ParserErrorKind::InvalidAssignmentTarget,
                ));
                Ok(lhs)
            }
        }
    }

    fn equality(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        self.infix_level(
            tree,
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        self.infix_level(
            tree,
            &[
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEqual,
                TokenKind::LessThan,
                TokenKind::LessThanEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        self.infix_level(tree, &[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        self.infix_level(tree, &[TokenKind::Star, TokenKind::Slash], Self::unary)
    }

    /// Folds `operand (op operand)*` into a left-leaning chain of infix nodes.
    fn infix_level(
        &mut self,
        tree: &mut IncompleteExpression,
        operators: &[TokenKind],
        operand: fn(&mut Self, &mut IncompleteExpression) -> NodeResult,
    ) -> NodeResult {
        let mut lhs = operand(self, tree)?;
        // Each operator in the chain deepens the left operand by one level.
        let outer = self.nesting;
        let result = self.infix_chain(tree, operators, operand, &mut lhs);
        self.nesting = outer;
        result.map(|()| lhs)
    }

    fn infix_chain(
        &mut self,
        tree: &mut IncompleteExpression,
        operators: &[TokenKind],
        operand: fn(&mut Self, &mut IncompleteExpression) -> NodeResult,
        lhs: &mut ExpressionNodeRef,
    ) -> Result<(), ParserError> {
        while let Some(token) = self.eat_any(operators) {
            self.enter_nesting()?;
            let operator = InfixOperator::from_token_kind(token.kind)
                .expect("Only infix operator tokens are matched.");
            let rhs = operand(self, tree)?;
            *lhs = tree.push(ExpressionNode::Infix {
                operator,
                lhs: *lhs,
                rhs,
                span: token.span,
            });
        }
        Ok(())
    }

    fn unary(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        match self.eat_any(&[TokenKind::Bang, TokenKind::Minus]) {
            Some(token) => {
                let operator = PrefixOperator::from_token_kind(token.kind)
                    .expect("Only prefix operator tokens are matched.");
                let rhs = self.nested(|parser| parser.unary(tree))?;
                Ok(tree.push(ExpressionNode::Prefix {
                    operator,
                    rhs,
                    span: token.span,
                }))
            }
            None => self.primary(tree),
        }
    }

    fn primary(&mut self, tree: &mut IncompleteExpression) -> NodeResult {
        let token = self.peek().clone();
        let literal = |value: LoxValue| {
            ExpressionNode::Literal(Literal {
                value,
                span: token.span,
            })
        };
        let node = match token.kind {
            TokenKind::NumericLiteral | TokenKind::StringLiteral => literal(
                token
                    .literal
                    .clone()
                    .expect("Literal tokens always carry their value."),
            ),
            TokenKind::KeywordTrue => literal(LoxValue::Bool(true)),
            TokenKind::KeywordFalse => literal(LoxValue::Bool(false)),
            TokenKind::KeywordNil => literal(LoxValue::Nil),
            TokenKind::Ident => ExpressionNode::Variable(Ident {
                name: token.lexeme,
                span: token.span,
            }),
            TokenKind::LeftParenthesis => {
                self.next_token();
                let inner = self.assignment(tree)?;
                self.expect(TokenKind::RightParenthesis, "after expression")?;
                return Ok(tree.push(ExpressionNode::Group { inner }));
            }
            _ => {
                return Err(ParserError::at_token(
                    &token,
                    ParserErrorKind::ExpectedExpression,
                ))
            }
        };
        self.next_token();
        Ok(tree.push(node))
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::VariableDecl(_) => "var",
        Statement::Expression(_) => "expression",
        Statement::Print(_) => "print",
        Statement::Block(_) => "block",
        Statement::If(_) => "if",
    }
}
