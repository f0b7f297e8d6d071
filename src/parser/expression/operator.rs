use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(Self::Bang),
            TokenKind::Minus => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Bang => "!",
            Self::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Multiply,
    Divide,
    Add,
    Subtract,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Star => Some(Self::Multiply),
            TokenKind::Slash => Some(Self::Divide),
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::LessThan => Some(Self::LessThan),
            TokenKind::LessThanEqual => Some(Self::LessThanEqual),
            TokenKind::GreaterThan => Some(Self::GreaterThan),
            TokenKind::GreaterThanEqual => Some(Self::GreaterThanEqual),
            TokenKind::EqualEqual => Some(Self::EqualEqual),
            TokenKind::BangEqual => Some(Self::BangEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
        }
    }
}
