//! Markup scanning and data-tree construction for tagcheck.
//!
//! Documents are read once with a streaming reader and folded into a
//! [`DataNode`] tree without native recursion:
//! - a tag repeated among its siblings becomes a `Sequence`
//! - a tag with children (or attributes) becomes a `Mapping`
//! - a tag with only text becomes a `Scalar`
//!
//! Well-formedness is enforced on every scan, so the same entry points double
//! as an early-rejection check.

pub mod document;
pub mod error;
pub mod node;
pub mod options;
pub mod scan;

pub use document::Document;
pub use error::{MarkupError, Result};
pub use node::DataNode;
pub use options::{
    AttributeMode, ParseOptions, DEFAULT_ATTRIBUTE_KEY, DEFAULT_TEXT_KEY,
};
pub use scan::{check_well_formed, scan, Attribute, Markup, OpenTag};
