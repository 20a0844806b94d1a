//! Primitive operators
//!
//! A primitive is a tagged variant; its arity, accepted input signatures,
//! return type and commutativity come from [`Primitive::descriptor`]. Kernels
//! live in the runtime crate, which keeps an explicit catalogue keyed by
//! these variants.

mod signature;

pub use signature::{PrimitiveDescriptor, ReturnType, Signature};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a primitive relates its inputs' entity to its output entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Reads a column as-is
    Identity,
    /// Row-wise function over one entity
    Transform,
    /// Ordered, grouped running reduction over one entity
    Cumulative,
    /// Child-to-parent reduction along a relationship
    Aggregation,
    /// Parent-to-child broadcast along a relationship
    Direct,
}

/// Primitive operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Identity,
    Direct,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// `literal - feature`
    ReverseSubtract,
    /// `literal / feature`
    ReverseDivide,
    /// `literal % feature`
    ReverseModulo,
    Negate,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // Boolean and tests
    And,
    Or,
    Not,
    IsIn,
    IsNull,

    // Datetime extraction
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Weekday,

    // Whole-column transforms
    Percentile,
    Diff,

    // Cumulative family
    CumSum,
    CumMean,
    CumMin,
    CumMax,
    CumCount,

    // Aggregations
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Mode,
}

impl Primitive {
    /// Every primitive, in declaration order
    pub const ALL: [Primitive; 42] = [
        Primitive::Identity,
        Primitive::Direct,
        Primitive::Add,
        Primitive::Subtract,
        Primitive::Multiply,
        Primitive::Divide,
        Primitive::Modulo,
        Primitive::ReverseSubtract,
        Primitive::ReverseDivide,
        Primitive::ReverseModulo,
        Primitive::Negate,
        Primitive::Equal,
        Primitive::NotEqual,
        Primitive::LessThan,
        Primitive::LessThanEqual,
        Primitive::GreaterThan,
        Primitive::GreaterThanEqual,
        Primitive::And,
        Primitive::Or,
        Primitive::Not,
        Primitive::IsIn,
        Primitive::IsNull,
        Primitive::Year,
        Primitive::Month,
        Primitive::Day,
        Primitive::Hour,
        Primitive::Minute,
        Primitive::Second,
        Primitive::Weekday,
        Primitive::Percentile,
        Primitive::Diff,
        Primitive::CumSum,
        Primitive::CumMean,
        Primitive::CumMin,
        Primitive::CumMax,
        Primitive::CumCount,
        Primitive::Count,
        Primitive::Sum,
        Primitive::Mean,
        Primitive::Min,
        Primitive::Max,
        Primitive::Mode,
    ];

    /// Stable identifier, part of every feature identity
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Identity => "identity",
            Primitive::Direct => "direct",
            Primitive::Add => "add",
            Primitive::Subtract => "subtract",
            Primitive::Multiply => "multiply",
            Primitive::Divide => "divide",
            Primitive::Modulo => "modulo",
            Primitive::ReverseSubtract => "reverse_subtract",
            Primitive::ReverseDivide => "reverse_divide",
            Primitive::ReverseModulo => "reverse_modulo",
            Primitive::Negate => "negate",
            Primitive::Equal => "equal",
            Primitive::NotEqual => "not_equal",
            Primitive::LessThan => "less_than",
            Primitive::LessThanEqual => "less_than_equal",
            Primitive::GreaterThan => "greater_than",
            Primitive::GreaterThanEqual => "greater_than_equal",
            Primitive::And => "and",
            Primitive::Or => "or",
            Primitive::Not => "not",
            Primitive::IsIn => "is_in",
            Primitive::IsNull => "is_null",
            Primitive::Year => "year",
            Primitive::Month => "month",
            Primitive::Day => "day",
            Primitive::Hour => "hour",
            Primitive::Minute => "minute",
            Primitive::Second => "second",
            Primitive::Weekday => "weekday",
            Primitive::Percentile => "percentile",
            Primitive::Diff => "diff",
            Primitive::CumSum => "cum_sum",
            Primitive::CumMean => "cum_mean",
            Primitive::CumMin => "cum_min",
            Primitive::CumMax => "cum_max",
            Primitive::CumCount => "cum_count",
            Primitive::Count => "count",
            Primitive::Sum => "sum",
            Primitive::Mean => "mean",
            Primitive::Min => "min",
            Primitive::Max => "max",
            Primitive::Mode => "mode",
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Identity => PrimitiveKind::Identity,
            Primitive::Direct => PrimitiveKind::Direct,
            Primitive::CumSum
            | Primitive::CumMean
            | Primitive::CumMin
            | Primitive::CumMax
            | Primitive::CumCount => PrimitiveKind::Cumulative,
            Primitive::Count
            | Primitive::Sum
            | Primitive::Mean
            | Primitive::Min
            | Primitive::Max
            | Primitive::Mode => PrimitiveKind::Aggregation,
            _ => PrimitiveKind::Transform,
        }
    }

    /// Infix symbol for binary primitives written between their operands
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Primitive::Add => Some("+"),
            Primitive::Subtract | Primitive::ReverseSubtract => Some("-"),
            Primitive::Multiply => Some("*"),
            Primitive::Divide | Primitive::ReverseDivide => Some("/"),
            Primitive::Modulo | Primitive::ReverseModulo => Some("%"),
            Primitive::Equal => Some("="),
            Primitive::NotEqual => Some("!="),
            Primitive::LessThan => Some("<"),
            Primitive::LessThanEqual => Some("<="),
            Primitive::GreaterThan => Some(">"),
            Primitive::GreaterThanEqual => Some(">="),
            Primitive::And => Some("AND"),
            Primitive::Or => Some("OR"),
            _ => None,
        }
    }

    /// Upper-case label for function-style names such as `CUM_SUM(...)`
    pub fn display_name(&self) -> String {
        self.name().to_uppercase()
    }

    /// Returns true for binary primitives that accept a literal operand
    pub fn is_infix(&self) -> bool {
        self.symbol().is_some()
    }

    /// Returns true for the reverse arithmetic variants
    pub fn is_reversed(&self) -> bool {
        matches!(
            self,
            Primitive::ReverseSubtract | Primitive::ReverseDivide | Primitive::ReverseModulo
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Primitive::Equal
                | Primitive::NotEqual
                | Primitive::LessThan
                | Primitive::LessThanEqual
                | Primitive::GreaterThan
                | Primitive::GreaterThanEqual
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Primitive::Add
                | Primitive::Subtract
                | Primitive::Multiply
                | Primitive::Divide
                | Primitive::Modulo
                | Primitive::ReverseSubtract
                | Primitive::ReverseDivide
                | Primitive::ReverseModulo
        )
    }

    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            Primitive::Add
                | Primitive::Multiply
                | Primitive::Equal
                | Primitive::NotEqual
                | Primitive::And
                | Primitive::Or
        )
    }

    /// The primitive computing the same result with its two operands swapped.
    ///
    /// Used to move a left-hand literal to the right: `2 - f` becomes
    /// `ReverseSubtract(f, 2)` and `2 < f` becomes `GreaterThan(f, 2)`.
    pub fn swapped(&self) -> Option<Primitive> {
        let swapped = match self {
            Primitive::Subtract => Primitive::ReverseSubtract,
            Primitive::ReverseSubtract => Primitive::Subtract,
            Primitive::Divide => Primitive::ReverseDivide,
            Primitive::ReverseDivide => Primitive::Divide,
            Primitive::Modulo => Primitive::ReverseModulo,
            Primitive::ReverseModulo => Primitive::Modulo,
            Primitive::LessThan => Primitive::GreaterThan,
            Primitive::GreaterThan => Primitive::LessThan,
            Primitive::LessThanEqual => Primitive::GreaterThanEqual,
            Primitive::GreaterThanEqual => Primitive::LessThanEqual,
            p if p.is_commutative() => *p,
            _ => return None,
        };
        Some(swapped)
    }

    /// The non-reversed counterpart of a reverse arithmetic variant
    pub fn forward(&self) -> Primitive {
        match self {
            Primitive::ReverseSubtract => Primitive::Subtract,
            Primitive::ReverseDivide => Primitive::Divide,
            Primitive::ReverseModulo => Primitive::Modulo,
            p => *p,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
