//! Binary operator table.
//!
//! `binary_op` nodes carry their operator as a source symbol in the node's
//! `value` field (`"+"`, `">="`, `"and"`, ...). [`BinaryOperator`] is the
//! closed set of symbols the compiler and decompiler understand, grouped the
//! same way the target language groups them:
//!
//! - **Arithmetic**: `+ - * / // % **`
//! - **Comparison**: `== != < <= > >=`
//! - **Boolean**: `and or`
//!
//! # Precedence
//!
//! [`BinaryOperator::precedence`] follows the target language's binding
//! strength. The renderer uses it to decide where parentheses are needed;
//! nothing else depends on it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator carried by a `binary_op` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    And,
    Or,
}

/// Broad operator family, used for rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Boolean,
}

impl BinaryOperator {
    /// Every supported operator, in table order.
    pub const ALL: [BinaryOperator; 15] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::FloorDiv,
        BinaryOperator::Mod,
        BinaryOperator::Pow,
        BinaryOperator::Eq,
        BinaryOperator::NotEq,
        BinaryOperator::Lt,
        BinaryOperator::LtE,
        BinaryOperator::Gt,
        BinaryOperator::GtE,
        BinaryOperator::And,
        BinaryOperator::Or,
    ];

    /// Source symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::FloorDiv => "//",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtE => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtE => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    /// Looks up an operator by its source symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::FloorDiv
            | BinaryOperator::Mod
            | BinaryOperator::Pow => OperatorClass::Arithmetic,
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtE
            | BinaryOperator::Gt
            | BinaryOperator::GtE => OperatorClass::Comparison,
            BinaryOperator::And | BinaryOperator::Or => OperatorClass::Boolean,
        }
    }

    /// Binding strength; higher binds tighter.
    ///
    /// Unary sign sits at 13 (between `*` and `**`) and atoms at 16; those
    /// levels live in the renderer.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtE
            | BinaryOperator::Gt
            | BinaryOperator::GtE => 4,
            BinaryOperator::Add | BinaryOperator::Sub => 11,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::FloorDiv | BinaryOperator::Mod => 12,
            BinaryOperator::Pow => 14,
        }
    }

    /// `**` groups right-to-left; every other operator groups left-to-right
    /// (comparisons do not group at all and are treated separately).
    pub fn is_right_associative(self) -> bool {
        self == BinaryOperator::Pow
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_roundtrip_through_lookup() {
        for op in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        assert_eq!(BinaryOperator::from_symbol("<<"), None);
        assert_eq!(BinaryOperator::from_symbol("is"), None);
        assert_eq!(BinaryOperator::from_symbol(""), None);
    }

    #[test]
    fn precedence_orders_families() {
        assert!(BinaryOperator::Or.precedence() < BinaryOperator::And.precedence());
        assert!(BinaryOperator::And.precedence() < BinaryOperator::Lt.precedence());
        assert!(BinaryOperator::Lt.precedence() < BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Add.precedence() < BinaryOperator::Mul.precedence());
        assert!(BinaryOperator::Mul.precedence() < BinaryOperator::Pow.precedence());
    }

    #[test]
    fn classes() {
        assert_eq!(BinaryOperator::FloorDiv.class(), OperatorClass::Arithmetic);
        assert_eq!(BinaryOperator::GtE.class(), OperatorClass::Comparison);
        assert_eq!(BinaryOperator::Or.class(), OperatorClass::Boolean);
        assert!(BinaryOperator::Pow.is_right_associative());
        assert!(!BinaryOperator::Sub.is_right_associative());
    }
}
