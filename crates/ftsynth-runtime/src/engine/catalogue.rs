//! Primitive catalogue
//!
//! Maps each [`Primitive`] to the kernel the executor dispatches to. The
//! catalogue is an explicit value owned by the executor; `standard()` covers
//! every built-in primitive, and callers may register replacements.

use super::aggregate::AggregateKind;
use super::cumulative::CumulativeKind;
use super::transform;
use crate::error::{Result, RuntimeError};
use ftsynth_core::{FeatureConfig, Primitive, Value};
use std::collections::HashMap;

/// Maps one row's operand values to one output value
pub type RowKernel = fn(Primitive, &[&Value], &FeatureConfig) -> Result<Value>;

/// Maps whole operand columns of a frame to one output column
pub type ColumnKernel = fn(&[&[Value]]) -> Result<Vec<Value>>;

/// Evaluation strategy of a primitive
#[derive(Clone, Copy)]
pub enum Kernel {
    /// Gather a column of the entity source
    Variable,
    /// Broadcast a parent column to child rows
    Direct,
    RowWise(RowKernel),
    Column(ColumnKernel),
    Cumulative(CumulativeKind),
    Aggregate(AggregateKind),
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kernel::Variable => write!(f, "Variable"),
            Kernel::Direct => write!(f, "Direct"),
            Kernel::RowWise(_) => write!(f, "RowWise"),
            Kernel::Column(_) => write!(f, "Column"),
            Kernel::Cumulative(kind) => write!(f, "Cumulative({:?})", kind),
            Kernel::Aggregate(kind) => write!(f, "Aggregate({:?})", kind),
        }
    }
}

/// Primitive-to-kernel table
#[derive(Debug, Clone)]
pub struct PrimitiveCatalogue {
    kernels: HashMap<Primitive, Kernel>,
}

impl PrimitiveCatalogue {
    /// Catalogue without any kernel
    pub fn empty() -> Self {
        Self {
            kernels: HashMap::new(),
        }
    }

    /// Catalogue with every built-in primitive
    pub fn standard() -> Self {
        let mut catalogue = Self::empty();
        catalogue.register(Primitive::Identity, Kernel::Variable);
        catalogue.register(Primitive::Direct, Kernel::Direct);

        for primitive in [
            Primitive::Add,
            Primitive::Subtract,
            Primitive::Multiply,
            Primitive::Divide,
            Primitive::Modulo,
            Primitive::ReverseSubtract,
            Primitive::ReverseDivide,
            Primitive::ReverseModulo,
            Primitive::Equal,
            Primitive::NotEqual,
            Primitive::LessThan,
            Primitive::LessThanEqual,
            Primitive::GreaterThan,
            Primitive::GreaterThanEqual,
            Primitive::And,
            Primitive::Or,
        ] {
            catalogue.register(primitive, Kernel::RowWise(transform::binary_kernel));
        }

        for primitive in [Primitive::Negate, Primitive::Not, Primitive::IsNull] {
            catalogue.register(primitive, Kernel::RowWise(transform::unary_kernel));
        }
        catalogue.register(Primitive::IsIn, Kernel::RowWise(transform::is_in_kernel));

        for primitive in [
            Primitive::Year,
            Primitive::Month,
            Primitive::Day,
            Primitive::Hour,
            Primitive::Minute,
            Primitive::Second,
            Primitive::Weekday,
        ] {
            catalogue.register(primitive, Kernel::RowWise(transform::datetime_part_kernel));
        }

        catalogue.register(Primitive::Percentile, Kernel::Column(transform::percentile_kernel));
        catalogue.register(Primitive::Diff, Kernel::Column(transform::diff_kernel));

        catalogue.register(Primitive::CumSum, Kernel::Cumulative(CumulativeKind::Sum));
        catalogue.register(Primitive::CumMean, Kernel::Cumulative(CumulativeKind::Mean));
        catalogue.register(Primitive::CumMin, Kernel::Cumulative(CumulativeKind::Min));
        catalogue.register(Primitive::CumMax, Kernel::Cumulative(CumulativeKind::Max));
        catalogue.register(Primitive::CumCount, Kernel::Cumulative(CumulativeKind::Count));

        catalogue.register(Primitive::Count, Kernel::Aggregate(AggregateKind::Count));
        catalogue.register(Primitive::Sum, Kernel::Aggregate(AggregateKind::Sum));
        catalogue.register(Primitive::Mean, Kernel::Aggregate(AggregateKind::Mean));
        catalogue.register(Primitive::Min, Kernel::Aggregate(AggregateKind::Min));
        catalogue.register(Primitive::Max, Kernel::Aggregate(AggregateKind::Max));
        catalogue.register(Primitive::Mode, Kernel::Aggregate(AggregateKind::Mode));

        catalogue
    }

    /// Register or replace the kernel of a primitive
    pub fn register(&mut self, primitive: Primitive, kernel: Kernel) {
        self.kernels.insert(primitive, kernel);
    }

    /// Kernel of a primitive
    pub fn kernel(&self, primitive: Primitive) -> Result<Kernel> {
        self.kernels
            .get(&primitive)
            .copied()
            .ok_or_else(|| RuntimeError::UnsupportedPrimitive(primitive.to_string()))
    }

    pub fn supports(&self, primitive: Primitive) -> bool {
        self.kernels.contains_key(&primitive)
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

impl Default for PrimitiveCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_primitive() {
        let catalogue = PrimitiveCatalogue::standard();
        for primitive in Primitive::ALL {
            assert!(catalogue.supports(primitive), "missing kernel for {}", primitive);
        }
        assert_eq!(catalogue.len(), Primitive::ALL.len());
    }

    #[test]
    fn test_empty_catalogue_rejects() {
        let catalogue = PrimitiveCatalogue::empty();
        assert!(catalogue.is_empty());
        assert!(matches!(
            catalogue.kernel(Primitive::CumSum),
            Err(RuntimeError::UnsupportedPrimitive(name)) if name == "cum_sum"
        ));
    }
}
