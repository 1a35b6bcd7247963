//! # Validation Entry Point
//!
//! Runs a record through the rule engine and turns its violations into an
//! [`ErrorReport`](crate::report::ErrorReport).
//!
//! Every call ends in exactly one of three outcomes:
//!
//! - `Ok(())`: no rule failed
//! - `Err(Error::ValidationFailed(report))`: at least one rule failed
//! - `Err(Error::EngineFault(fault))`: the engine could not evaluate the
//!   record; no report is built

use crate::catalog::MessageCatalog;
use crate::engine::{RuleEngine, ValidatorEngine};
use crate::error::{Error, Result};
use crate::report::aggregate;
use crate::shape::Record;
use tracing::debug;
use validator::Validate;

/// Validates records against a message catalog
///
/// # Example
///
/// ```
/// use validator::Validate;
/// use valmsg::{Record, Validator};
///
/// #[derive(Validate, Record)]
/// struct Login {
///     #[validate(required, email)]
///     email: Option<String>,
/// }
///
/// let validator = Validator::new();
/// let err = validator.validate(&Login { email: None }).unwrap_err();
/// assert_eq!(err.to_string(), r#"{"email":["field is required"]}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator<E = ValidatorEngine> {
    catalog: MessageCatalog,
    engine: E,
}

impl Validator {
    /// Create a validator with the built-in messages
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator sharing an existing catalog
    #[must_use]
    pub const fn with_catalog(catalog: MessageCatalog) -> Self {
        Self {
            catalog,
            engine: ValidatorEngine,
        }
    }
}

impl<E> Validator<E> {
    /// Create a validator with a custom rule engine
    pub const fn with_engine(catalog: MessageCatalog, engine: E) -> Self {
        Self { catalog, engine }
    }

    /// The catalog messages are resolved against
    #[must_use]
    pub const fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Register a template on this validator's catalog
    pub fn register(&self, tag: impl Into<String>, template: impl Into<String>) {
        self.catalog.register(tag, template);
    }
}

impl<E: RuleEngine> Validator<E> {
    /// Validate a record
    ///
    /// # Errors
    ///
    /// - `Error::ValidationFailed` with the per-field report when any rule
    ///   fails
    /// - `Error::EngineFault` when the engine cannot evaluate the record
    pub fn validate<R: Validate + Record>(&self, record: &R) -> Result<()> {
        let shape = R::shape();
        let violations = self.engine.evaluate(record)?;
        if violations.is_empty() {
            debug!(record = shape.name(), "record is valid");
            return Ok(());
        }

        let report = aggregate(shape, &violations, &self.catalog);
        debug!(
            record = shape.name(),
            violations = violations.len(),
            fields = report.len(),
            "record failed validation"
        );
        Err(Error::ValidationFailed(report))
    }
}

/// Validate a record with the default engine and the given catalog
///
/// # Errors
///
/// See [`Validator::validate`].
pub fn validate<R: Validate + Record>(record: &R, catalog: &MessageCatalog) -> Result<()> {
    Validator::with_catalog(catalog.clone()).validate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Violation;
    use crate::error::EngineFault;

    /// Engine that ignores the record and replays a fixed outcome
    struct ScriptedEngine(std::result::Result<Vec<Violation>, EngineFault>);

    impl RuleEngine for ScriptedEngine {
        fn evaluate<R: Validate + Record>(
            &self,
            _record: &R,
        ) -> std::result::Result<Vec<Violation>, EngineFault> {
            self.0.clone()
        }
    }

    #[derive(serde::Serialize, Validate, crate::Record)]
    struct Profile {
        #[record(alias = "display_name")]
        #[validate(length(min = 3))]
        name: String,
        #[serde(rename = "years")]
        #[validate(range(min = 18, max = 130))]
        age: u32,
    }

    fn profile(name: &str, age: u32) -> Profile {
        Profile {
            name: name.to_string(),
            age,
        }
    }

    #[test]
    fn test_valid_record() {
        let validator = Validator::new();
        assert!(validator.validate(&profile("Ada", 36)).is_ok());
    }

    #[test]
    fn test_invalid_record_reports_aliases() {
        let validator = Validator::new();
        let err = validator.validate(&profile("Al", 12)).unwrap_err();
        let report = err.report().unwrap();

        assert_eq!(
            report.get("display_name"),
            Some(&["minimum field length is 3".to_string()][..])
        );
        assert_eq!(
            report.get("years"),
            Some(&["field value must be greater than or equal to 18".to_string()][..])
        );
        assert_eq!(report.fields().collect::<Vec<_>>(), ["display_name", "years"]);
    }

    #[test]
    fn test_registered_template_applies() {
        let validator = Validator::new();
        validator.register("gte", "must be at least {param}");
        let err = validator.validate(&profile("Ada", 5)).unwrap_err();
        assert_eq!(err.to_string(), r#"{"years":["must be at least 18"]}"#);
    }

    #[test]
    fn test_engine_fault_bypasses_aggregation() {
        let engine = ScriptedEngine(Err(EngineFault::new("cannot evaluate")));
        let validator = Validator::with_engine(MessageCatalog::new(), engine);
        let err = validator.validate(&profile("Ada", 36)).unwrap_err();

        assert!(matches!(err, Error::EngineFault(_)));
        assert!(err.report().is_none());
    }

    #[test]
    fn test_scripted_violations_are_aggregated() {
        let engine = ScriptedEngine(Ok(vec![
            Violation::new("age", "lt").with_param("100"),
            Violation::new("ghost", "required"),
            Violation::new("name", "required"),
        ]));
        let validator = Validator::with_engine(MessageCatalog::new(), engine);
        let err = validator.validate(&profile("Ada", 36)).unwrap_err();

        assert_eq!(
            err.to_string(),
            r#"{"years":["field value must be less than 100"],"display_name":["field is required"]}"#
        );
    }

    #[test]
    fn test_all_violations_mismatched_still_fails() {
        let engine = ScriptedEngine(Ok(vec![Violation::new("ghost", "required")]));
        let validator = Validator::with_engine(MessageCatalog::new(), engine);
        let err = validator.validate(&profile("Ada", 36)).unwrap_err();

        assert!(err.report().is_some_and(crate::ErrorReport::is_empty));
    }

    #[test]
    fn test_free_function_uses_given_catalog() {
        let catalog = MessageCatalog::empty();
        catalog.register("min", "too short, need {param}");
        let err = validate(&profile("Al", 40), &catalog).unwrap_err();
        assert_eq!(err.to_string(), r#"{"display_name":["too short, need 3"]}"#);
    }
}
