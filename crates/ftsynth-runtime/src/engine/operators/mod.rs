//! Operator execution modules
//!
//! Scalar kernels shared by the row-wise transform primitives.

mod binary;
mod comparison;
mod unary;

pub(crate) use binary::execute_binary_op;
pub(crate) use unary::execute_unary_op;
