//! Operator sugar for building features
//!
//! Arithmetic and boolean operators construct nodes through
//! [`Feature::construct`] and return `Result<Feature>`, since a combination
//! may fail type or entity checks. Rust comparison operators must return
//! `bool`, so comparisons are fluent methods instead.

use crate::error::Result;
use crate::feature::{Feature, FeatureConfig, Operand};
use crate::primitive::Primitive;
use crate::types::Value;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Rem, Sub};

impl Feature {
    fn binary(primitive: Primitive, left: Operand, right: Operand) -> Result<Feature> {
        Feature::construct(primitive, vec![left, right], FeatureConfig::new())
    }

    fn unary(&self, primitive: Primitive) -> Result<Feature> {
        Feature::construct(primitive, vec![self.into()], FeatureConfig::new())
    }

    pub fn equals(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::Equal, self.into(), other.into())
    }

    pub fn not_equals(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::NotEqual, self.into(), other.into())
    }

    pub fn lt(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::LessThan, self.into(), other.into())
    }

    pub fn lt_eq(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::LessThanEqual, self.into(), other.into())
    }

    pub fn gt(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::GreaterThan, self.into(), other.into())
    }

    pub fn gt_eq(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::GreaterThanEqual, self.into(), other.into())
    }

    pub fn and(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::And, self.into(), other.into())
    }

    pub fn or(&self, other: impl Into<Operand>) -> Result<Feature> {
        Self::binary(Primitive::Or, self.into(), other.into())
    }

    /// Membership test against a fixed list
    pub fn isin<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Result<Feature> {
        let values = values.into_iter().map(Into::into).collect();
        Feature::construct(
            Primitive::IsIn,
            vec![self.into()],
            FeatureConfig::new().with_values(values),
        )
    }

    pub fn is_null(&self) -> Result<Feature> {
        self.unary(Primitive::IsNull)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $primitive:expr) => {
        impl<R: Into<Operand>> $trait<R> for Feature {
            type Output = Result<Feature>;

            fn $method(self, rhs: R) -> Result<Feature> {
                Feature::binary($primitive, self.into(), rhs.into())
            }
        }

        impl<R: Into<Operand>> $trait<R> for &Feature {
            type Output = Result<Feature>;

            fn $method(self, rhs: R) -> Result<Feature> {
                Feature::binary($primitive, self.into(), rhs.into())
            }
        }
    };
}

impl_binary_op!(Add, add, Primitive::Add);
impl_binary_op!(Sub, sub, Primitive::Subtract);
impl_binary_op!(Mul, mul, Primitive::Multiply);
impl_binary_op!(Div, div, Primitive::Divide);
impl_binary_op!(Rem, rem, Primitive::Modulo);
impl_binary_op!(BitAnd, bitand, Primitive::And);
impl_binary_op!(BitOr, bitor, Primitive::Or);

/// `2 - f` and friends; normalization in `construct` picks the reverse variant
macro_rules! impl_scalar_left_op {
    ($scalar:ty; $(($trait:ident, $method:ident, $primitive:expr)),*) => {
        $(
            impl $trait<Feature> for $scalar {
                type Output = Result<Feature>;

                fn $method(self, rhs: Feature) -> Result<Feature> {
                    Feature::binary($primitive, self.into(), rhs.into())
                }
            }

            impl $trait<&Feature> for $scalar {
                type Output = Result<Feature>;

                fn $method(self, rhs: &Feature) -> Result<Feature> {
                    Feature::binary($primitive, self.into(), rhs.into())
                }
            }
        )*
    };
}

macro_rules! impl_scalar_left_ops {
    ($($scalar:ty),*) => {
        $(
            impl_scalar_left_op!($scalar;
                (Add, add, Primitive::Add),
                (Sub, sub, Primitive::Subtract),
                (Mul, mul, Primitive::Multiply),
                (Div, div, Primitive::Divide),
                (Rem, rem, Primitive::Modulo)
            );
        )*
    };
}

impl_scalar_left_ops!(f64, i64, i32);

impl Neg for Feature {
    type Output = Result<Feature>;

    fn neg(self) -> Result<Feature> {
        self.unary(Primitive::Negate)
    }
}

impl Neg for &Feature {
    type Output = Result<Feature>;

    fn neg(self) -> Result<Feature> {
        self.unary(Primitive::Negate)
    }
}

impl Not for Feature {
    type Output = Result<Feature>;

    fn not(self) -> Result<Feature> {
        self.unary(Primitive::Not)
    }
}

impl Not for &Feature {
    type Output = Result<Feature>;

    fn not(self) -> Result<Feature> {
        self.unary(Primitive::Not)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntitySchema, VariableType};
    use std::sync::Arc;

    fn schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::new("log", "id")
                .add_variable("value", VariableType::Numeric)
                .add_variable("value_2", VariableType::Numeric)
                .add_variable("purchased", VariableType::Boolean),
        )
    }

    #[test]
    fn test_operator_matches_explicit_construction() {
        let value = Feature::variable(&schema(), "value").unwrap();
        let sugared = (&value + 2).unwrap();
        let explicit = Feature::construct(
            Primitive::Add,
            vec![value.clone().into(), 2.into()],
            FeatureConfig::new(),
        )
        .unwrap();
        assert_eq!(sugared.id(), explicit.id());
        assert_eq!(sugared.name(), "value + 2");
    }

    #[test]
    fn test_scalar_left_commutative() {
        let value = Feature::variable(&schema(), "value").unwrap();
        let left = (2i64 * &value).unwrap();
        let right = (&value * 2).unwrap();
        assert_eq!(left, right);
        assert_eq!(left.name(), right.name());
    }

    #[test]
    fn test_scalar_left_reverse_variants() {
        let value = Feature::variable(&schema(), "value").unwrap();
        assert_eq!((2i64 - &value).unwrap().primitive(), Primitive::ReverseSubtract);
        assert_eq!((2.0 / &value).unwrap().primitive(), Primitive::ReverseDivide);
        assert_eq!((2i64 % &value).unwrap().primitive(), Primitive::ReverseModulo);
        assert_eq!((2i64 / &value).unwrap().name(), "2 / value");
    }

    #[test]
    fn test_commutative_feature_pairs_collapse() {
        let schema = schema();
        let a = Feature::variable(&schema, "value").unwrap();
        let b = Feature::variable(&schema, "value_2").unwrap();
        assert_eq!((&a + &b).unwrap(), (&b + &a).unwrap());
        assert_eq!((&a * &b).unwrap().name(), (&b * &a).unwrap().name());
        assert_ne!((&a - &b).unwrap(), (&b - &a).unwrap());
    }

    #[test]
    fn test_boolean_operators() {
        let purchased = Feature::variable(&schema(), "purchased").unwrap();
        let negated = (!&purchased).unwrap();
        assert_eq!(negated.name(), "NOT(purchased)");
        assert_eq!(negated.variable_type(), VariableType::Boolean);

        let value = Feature::variable(&schema(), "value").unwrap();
        assert!((!&value).is_err());

        let both = (&purchased & &negated).unwrap();
        assert_eq!(both, (&negated & &purchased).unwrap());
        assert!(both.name().contains(" AND "));
    }

    #[test]
    fn test_negate_name() {
        let value = Feature::variable(&schema(), "value").unwrap();
        assert_eq!((-&value).unwrap().name(), "-(value)");
    }

    #[test]
    fn test_isin_name() {
        let value = Feature::variable(&schema(), "value").unwrap();
        let isin = value.isin([5, 10]).unwrap();
        assert_eq!(isin.name(), "value.isin([5, 10])");
        assert_ne!(isin, value.isin([10, 5]).unwrap());
    }
}
