//! Runtime capability surface consumed by the parser
//!
//! The front end does not evaluate anything; the only runtime services it
//! needs are building constant values for literals and reporting errors:
//! - [`value`]: tagged runtime values ([`Value`]) shared through [`ValueRef`]
//! - [`errors`]: the error taxonomy ([`ParseError`]) raised by the pipeline
//!
//! Values embedded in the AST are registered with the owning arena so that a
//! single arena teardown releases node storage and values uniformly.

pub mod errors;
pub mod value;

pub use errors::ParseError;
pub use value::{Value, ValueRef};
