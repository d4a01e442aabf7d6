//! The straight-line starter language: integer variables, arithmetic and
//! host calls, no control flow.

pub mod ast;
pub mod compile;
pub mod tychecker;
