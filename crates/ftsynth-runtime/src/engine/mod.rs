//! Kernel layer of the evaluation engine
//!
//! - `operators`: scalar arithmetic, comparison and logical operators
//! - `transform`: row-wise and whole-column transform kernels
//! - `aggregate`: child-to-parent grouped reductions
//! - `cumulative`: windowed running reductions
//! - `catalogue`: primitive-to-kernel dispatch table

pub mod aggregate;
pub mod catalogue;
pub mod cumulative;
mod operators;
mod transform;

pub use aggregate::AggregateKind;
pub use catalogue::{ColumnKernel, Kernel, PrimitiveCatalogue, RowKernel};
pub use cumulative::CumulativeKind;
