//! Validate markup documents against markup-defined rule schemas.
//!
//! A schema is written in the same markup as the documents it checks: nesting
//! gives the expected shape and attributes give per-value constraints such as
//! `type`, `minLength`, `pattern`, `min` or `repeatable`. Validation never
//! stops at the first problem; it returns every failure with the dotted path
//! where it occurred.
//!
//! # Crate Structure
//!
//! - [`tree`]: streaming markup scanner, well-formedness checks and data trees
//! - [`schema`]: rule compilation, custom checks and the validator
//!
//! ```
//! use tagcheck::Validator;
//!
//! let validator = Validator::new(r#"<user><name minLength="2"/><age type="integer"/></user>"#)?;
//! let failures = validator.validate("<user><name>A</name><age>x</age></user>")?;
//! let codes: Vec<&str> = failures.iter().map(|f| f.code.as_str()).collect();
//! assert_eq!(codes, ["minLength", "not a integer"]);
//! # Ok::<(), tagcheck::SchemaError>(())
//! ```

/// Re-export markup and data-tree types.
pub mod tree {
    pub use tagcheck_tree::*;
}

/// Re-export rule and validation types.
pub mod schema {
    pub use tagcheck_schema::*;
}

pub use tagcheck_schema::{Failure, SchemaError, Validator, ValidatorConfig};
