//! Operator implementation macros.

mod ops;
