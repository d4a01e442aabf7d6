//! The full course language: integers, booleans, comparisons,
//! short-circuit logic, `if` / `else` and `while`.

pub mod ast;
pub mod compile;
pub mod tychecker;
