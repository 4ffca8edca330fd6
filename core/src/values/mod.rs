//! Run-time values.
//!
//! Formulas are dynamically typed: no type is attached to a term, and every
//! operator or built-in checks the kinds of the values it receives.

mod object;
mod value;

#[cfg(test)]
mod value_test;

pub use object::{FunctionalObject, ObjectRegistry};
pub use value::Value;
