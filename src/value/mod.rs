pub mod error;

use compact_str::{CompactString, CompactStringExt};
use error::RuntimeErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum LoxValue {
    Number(f64),
    String(CompactString),
    Bool(bool),
    Nil,
}

impl std::fmt::Display for LoxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Nil => write!(f, "nil"),
        }
    }
}

impl LoxValue {
    /// Verbose rendering that also names the variant, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            LoxValue::Number(v) => format!("Number({v})"),
            LoxValue::String(v) => format!("String(\"{v}\")"),
            LoxValue::Bool(v) => format!("Bool({v})"),
            LoxValue::Nil => "Nil".into(),
        }
    }
}

// Unary operators
impl LoxValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LoxValue::Bool(false) | LoxValue::Nil)
    }

    pub fn logical_not(&self) -> LoxValue {
        LoxValue::Bool(!self.is_truthy())
    }

    pub fn numeric_negate(&self) -> Result<LoxValue, RuntimeErrorKind> {
        match self {
            LoxValue::Number(v) => Ok(LoxValue::Number(-v)),
            v => Err(RuntimeErrorKind::NonNumeric(v.clone())),
        }
    }
}

impl LoxValue {
    // Arithmetic + string concatenation
    pub fn add(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(LoxValue::Number(lhs + rhs)),
            (LoxValue::String(lhs), LoxValue::String(rhs)) => {
                Ok(LoxValue::String([lhs, rhs].concat_compact()))
            }
            (lhs, rhs) => Err(RuntimeErrorKind::NonAddable(lhs.clone(), rhs.clone())),
        }
    }

    pub fn subtract(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs * rhs))
    }

    pub fn divide(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs / rhs))
    }

    // Comparison
    pub fn less_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &LoxValue) -> LoxValue {
        LoxValue::Bool(self == other)
    }

    pub fn is_not_equal(&self, other: &LoxValue) -> LoxValue {
        LoxValue::Bool(self != other)
    }

    fn numeric_binary(
        &self,
        other: &LoxValue,
        operation: impl FnOnce(f64, f64) -> LoxValue,
    ) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(operation(*lhs, *rhs)),
            (lhs, rhs) => Err(RuntimeErrorKind::NonNumerics(lhs.clone(), rhs.clone())),
        }
    }
}
