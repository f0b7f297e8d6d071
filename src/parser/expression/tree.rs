use super::{InfixOperator, PrefixOperator};
use crate::lexer::Span;
use crate::string::Ident;
use crate::value::LoxValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LoxValue,
    pub span: Span,
}

/// Index of a node inside its [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionNodeRef(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Literal(Literal),
    Group {
        inner: ExpressionNodeRef,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: ExpressionNodeRef,
        /// Span of the operator token.
        span: Span,
    },
    Infix {
        operator: InfixOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
        /// Span of the operator token.
        span: Span,
    },
    Variable(Ident),
    Assignment {
        lhs: Ident,
        rhs: ExpressionNodeRef,
    },
}

impl ExpressionNode {
    pub fn get_l_value(&self) -> Option<Ident> {
        match self {
            ExpressionNode::Variable(name) => Some(name.clone()),
            _ => None,
        }
    }
}

/// An expression whose nodes are still being pushed by the parser.
///
/// Children are always pushed before their parent, so a finished tree never
/// refers forward and has no cycles.
#[derive(Debug, Clone, Default)]
pub struct IncompleteExpression {
    nodes: Vec<ExpressionNode>,
}

impl IncompleteExpression {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: ExpressionNode) -> ExpressionNodeRef {
        self.nodes.push(node);
        ExpressionNodeRef(self.nodes.len() as u32 - 1)
    }

    pub fn get_node(&self, index: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(index.0 as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    nodes: Vec<ExpressionNode>,
    root: ExpressionNodeRef,
}

impl Expression {
    pub fn new(tree: IncompleteExpression, root: ExpressionNodeRef) -> Option<Self> {
        if !(0..tree.nodes.len()).contains(&(root.0 as usize)) {
            None
        } else {
            Some(Self {
                nodes: tree.nodes,
                root,
            })
        }
    }

    pub fn get_root_ref(&self) -> ExpressionNodeRef {
        self.root
    }

    pub fn get_root(&self) -> &ExpressionNode {
        self.get_node(self.get_root_ref())
            .expect("The root exists within the tree.")
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }

    /// Span covering the whole subtree rooted at `node`.
    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        let span = match self.get_node(node)? {
            ExpressionNode::Literal(literal) => literal.span,
            ExpressionNode::Variable(name) => name.span,
            ExpressionNode::Group { inner } => self.get_span(*inner)?,
            ExpressionNode::Prefix { rhs, span, .. } => span.merge(&self.get_span(*rhs)?),
            ExpressionNode::Infix { lhs, rhs, .. } => {
                self.get_span(*lhs)?.merge(&self.get_span(*rhs)?)
            }
            ExpressionNode::Assignment { lhs, rhs } => lhs.span.merge(&self.get_span(*rhs)?),
        };
        Some(span)
    }
}
