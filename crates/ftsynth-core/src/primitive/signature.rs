//! Primitive descriptors and type-signature matching

use super::{Primitive, PrimitiveKind};
use crate::error::{CoreError, Result};
use crate::types::VariableType;

use crate::types::VariableType::{Any, Boolean, Datetime, Discrete, Numeric, Ordinal, Timedelta};

/// Output type of a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Fixed(VariableType),
    /// Same type as the first operand
    SameAsFirst,
}

/// One accepted combination of input types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Vec<VariableType>,
    pub output: ReturnType,
}

impl Signature {
    fn new(inputs: &[VariableType], output: ReturnType) -> Self {
        Self {
            inputs: inputs.to_vec(),
            output,
        }
    }

    fn fixed(inputs: &[VariableType], output: VariableType) -> Self {
        Self::new(inputs, ReturnType::Fixed(output))
    }

    /// First slot whose type is not accepted, if any
    fn first_mismatch(&self, input_types: &[VariableType]) -> Option<usize> {
        self.inputs
            .iter()
            .zip(input_types)
            .position(|(declared, actual)| !actual.is_a(*declared))
    }
}

/// Declarative description of a primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveDescriptor {
    pub primitive: Primitive,
    pub kind: PrimitiveKind,
    /// Alternative signatures; operands must satisfy one of them
    pub signatures: Vec<Signature>,
    pub commutative: bool,
    pub number_output_features: usize,
}

impl PrimitiveDescriptor {
    /// Accepted operand counts, deduplicated
    pub fn arities(&self) -> Vec<usize> {
        let mut arities: Vec<usize> = self.signatures.iter().map(|s| s.inputs.len()).collect();
        arities.sort_unstable();
        arities.dedup();
        arities
    }

    /// Match operand types against the declared signatures and return the output type
    pub fn resolve(&self, input_types: &[VariableType]) -> Result<VariableType> {
        let candidates: Vec<&Signature> = self
            .signatures
            .iter()
            .filter(|s| s.inputs.len() == input_types.len())
            .collect();

        if candidates.is_empty() {
            return Err(CoreError::Arity(format!(
                "Primitive {} expects {:?} operands, got {}",
                self.primitive,
                self.arities(),
                input_types.len()
            )));
        }

        // Report the slot of the candidate that matched the longest prefix
        let mut worst_slot = 0;
        for signature in candidates {
            match signature.first_mismatch(input_types) {
                None => {
                    let output = match signature.output {
                        ReturnType::Fixed(t) => t,
                        ReturnType::SameAsFirst => strip_time_index(input_types[0]),
                    };
                    return Ok(output);
                }
                Some(slot) => worst_slot = worst_slot.max(slot),
            }
        }

        Err(CoreError::TypeMismatch {
            primitive: self.primitive.name().to_string(),
            found: input_types[worst_slot].to_string(),
            slot: worst_slot,
        })
    }
}

fn strip_time_index(t: VariableType) -> VariableType {
    if t.is_time_index() {
        t.parent().unwrap_or(t)
    } else {
        t
    }
}

impl Primitive {
    /// Descriptor for this primitive
    pub fn descriptor(&self) -> PrimitiveDescriptor {
        let signatures = match self {
            Primitive::Identity => vec![Signature::fixed(&[], Any)],
            Primitive::Direct => vec![Signature::new(&[Any], ReturnType::SameAsFirst)],

            Primitive::Add
            | Primitive::Multiply
            | Primitive::Divide
            | Primitive::Modulo
            | Primitive::ReverseDivide
            | Primitive::ReverseModulo => vec![Signature::fixed(&[Numeric, Numeric], Numeric)],
            Primitive::Subtract | Primitive::ReverseSubtract => vec![
                Signature::fixed(&[Numeric, Numeric], Numeric),
                Signature::fixed(&[Datetime, Datetime], Timedelta),
            ],
            Primitive::Negate => vec![Signature::fixed(&[Numeric], Numeric)],

            Primitive::Equal | Primitive::NotEqual => {
                vec![Signature::fixed(&[Any, Any], Boolean)]
            }
            Primitive::LessThan
            | Primitive::LessThanEqual
            | Primitive::GreaterThan
            | Primitive::GreaterThanEqual => vec![
                Signature::fixed(&[Numeric, Numeric], Boolean),
                Signature::fixed(&[Datetime, Datetime], Boolean),
                Signature::fixed(&[Ordinal, Ordinal], Boolean),
                Signature::fixed(&[Timedelta, Timedelta], Boolean),
            ],

            Primitive::And | Primitive::Or => {
                vec![Signature::fixed(&[Boolean, Boolean], Boolean)]
            }
            Primitive::Not => vec![Signature::fixed(&[Boolean], Boolean)],
            Primitive::IsIn | Primitive::IsNull => vec![Signature::fixed(&[Any], Boolean)],

            Primitive::Year
            | Primitive::Month
            | Primitive::Day
            | Primitive::Hour
            | Primitive::Minute
            | Primitive::Second
            | Primitive::Weekday => vec![Signature::fixed(&[Datetime], Numeric)],

            Primitive::Percentile => vec![Signature::fixed(&[Numeric], Numeric)],
            Primitive::Diff => vec![Signature::fixed(&[Numeric, Discrete], Numeric)],

            Primitive::CumSum | Primitive::CumMean | Primitive::CumMin | Primitive::CumMax => {
                cumulative_signatures(Numeric)
            }
            Primitive::CumCount => cumulative_signatures(Any),

            Primitive::Count => vec![Signature::fixed(&[Any], Numeric)],
            Primitive::Sum | Primitive::Mean | Primitive::Min | Primitive::Max => {
                vec![Signature::fixed(&[Numeric], Numeric)]
            }
            Primitive::Mode => vec![Signature::fixed(&[Discrete], VariableType::Categorical)],
        };

        PrimitiveDescriptor {
            primitive: *self,
            kind: self.kind(),
            signatures,
            commutative: self.is_commutative(),
            number_output_features: 1,
        }
    }
}

/// `(value, group)` with an optional explicit ordering column
fn cumulative_signatures(value: VariableType) -> Vec<Signature> {
    vec![
        Signature::fixed(&[value, Discrete], Numeric),
        Signature::fixed(&[value, Discrete, Datetime], Numeric),
        Signature::fixed(&[value, Discrete, Numeric], Numeric),
    ]
}
