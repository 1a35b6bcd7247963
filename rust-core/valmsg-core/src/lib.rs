//! # valmsg
//!
//! Human-readable, field-keyed error reports for `validator` structs.
//!
//! Rule evaluation is left to the `validator` crate. This crate turns the
//! violations it reports into messages looked up in a tag-to-template
//! catalog, grouped under each field's external name.
//!
//! ## Modules
//!
//! - `catalog` - Shared tag-to-template message table
//! - `engine` - Rule engine seam and the `validator` adapter
//! - `shape` - Compile-time record shapes (`#[derive(Record)]`)
//! - `report` - Field-keyed error report and aggregation
//! - `validate` - Validation entry point
//! - `json` - JSON parsing and serialization helpers
//! - `error` - Error types and handling
//!
//! ## Example
//!
//! ```
//! use validator::Validate;
//! use valmsg::{MessageCatalog, Record, Validator};
//!
//! #[derive(Validate, Record)]
//! struct User {
//!     #[record(alias = "username")]
//!     #[validate(required, length(min = 6, max = 32))]
//!     user_name: Option<String>,
//! }
//!
//! let validator = Validator::with_catalog(MessageCatalog::new());
//! let err = validator
//!     .validate(&User { user_name: Some("inv".into()) })
//!     .unwrap_err();
//! assert_eq!(err.to_string(), r#"{"username":["minimum field length is 6"]}"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Lets `#[derive(Record)]` expand to `::valmsg::..` inside this crate too.
extern crate self as valmsg;

pub mod catalog;
pub mod engine;
pub mod error;
pub mod json;
pub mod report;
pub mod shape;
pub mod validate;

pub use catalog::{format_template, MessageCatalog, BUILTIN_MESSAGES, PARAM_PLACEHOLDER};
pub use engine::{RuleEngine, ValidatorEngine, Violation, NESTED_TAG};
pub use error::{EngineFault, Error, Result};
pub use report::{aggregate, ErrorReport};
pub use shape::{FieldShape, Record, RecordShape};
pub use validate::{validate, Validator};
pub use valmsg_macros::Record;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
