//! Rule compilation and validation for tagcheck.
//!
//! A schema is itself markup: tag nesting defines the expected shape and
//! attributes define constraints on each value. Compile it once into a
//! [`RuleModel`], then validate any number of documents against it. Every
//! data problem is collected as a [`Failure`]; only author mistakes (bad
//! schema, malformed document, unregistered `checkBy` hook) are errors.
//!
//! ```
//! use tagcheck_schema::{Failure, Validator};
//!
//! let validator = Validator::new(r#"<root><age type="positiveInteger" max="150"/></root>"#)?;
//! let failures = validator.validate("<root><age>200</age></root>")?;
//! assert_eq!(failures, vec![Failure::predicate("max", "root.age", 200, 150)]);
//! # Ok::<(), tagcheck_schema::SchemaError>(())
//! ```

pub mod config;
pub mod error;
pub mod failure;
pub mod predicates;
pub mod registry;
pub mod rules;
pub mod setdiff;
pub mod traverser;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{Result, SchemaError};
pub use failure::Failure;
pub use predicates::Pattern;
pub use registry::{CheckFn, CheckRegistry};
pub use rules::{CheckRef, Constraints, RuleModel, RuleNode, RuleType};
pub use traverser::Traverser;
pub use validator::Validator;
