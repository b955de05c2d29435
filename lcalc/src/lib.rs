//! An untyped lambda calculus interpreter.
//!
//! Terms are built with [`term`], reduced with [`eval`] and compared with
//! [`equiv`]. [`encoding`] holds Church encodings of numbers, tuples and
//! lists. The remaining modules turn source text into terms.

pub mod compiler;
pub mod config;
pub mod encoding;
pub mod equiv;
pub mod eval;
pub mod lang;
pub mod parser;
pub mod prelude;
pub mod stdlib;
pub mod subst;
pub mod term;

pub use crate::{
    config::Config,
    eval::{reduce, Mode, Reduction, Strategy},
    term::{Term, Var},
};
