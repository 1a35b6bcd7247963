//! # Rule Engine Adapter
//!
//! Rule evaluation is delegated to the `validator` crate. This module turns
//! its error tree into a flat, ordered list of [`Violation`]s that the rest
//! of the pipeline consumes.
//!
//! ## Ordering
//!
//! `validator` keys its errors by field in a hash map. Violations are
//! emitted in the record's declaration order instead, with fields unknown to
//! the shape last (sorted by name), so identical input always yields
//! identical output.

use crate::error::EngineFault;
use crate::shape::{Record, RecordShape};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

type Params = HashMap<Cow<'static, str>, Value>;

/// Tag reported for a field whose nested struct or list failed
pub const NESTED_TAG: &str = "nested";

/// One failed rule on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field identifier as reported by the engine
    pub field: String,
    /// Rule tag (e.g. "required", "min")
    pub tag: String,
    /// Rule parameter, empty when the rule takes none
    pub param: String,
    /// The engine's own description, used when no template is registered
    pub default_message: String,
}

impl Violation {
    /// Create a violation with no parameter and a generic description
    pub fn new(field: impl Into<String>, tag: impl Into<String>) -> Self {
        let field = field.into();
        let tag = tag.into();
        Self {
            default_message: default_description(&field, &tag),
            field,
            tag,
            param: String::new(),
        }
    }

    /// Attach the rule parameter
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Replace the engine description
    #[must_use]
    pub fn with_default_message(mut self, message: impl Into<String>) -> Self {
        self.default_message = message.into();
        self
    }
}

fn default_description(field: &str, tag: &str) -> String {
    format!("field validation for '{field}' failed on the '{tag}' tag")
}

/// Evaluates a record's rules
///
/// The entry point treats any implementation as a black box: either a list
/// of violations (possibly empty) or a fault.
pub trait RuleEngine {
    /// Run every rule declared on `record`
    ///
    /// # Errors
    ///
    /// Returns `EngineFault` when the record cannot be evaluated at all.
    fn evaluate<R: Validate + Record>(&self, record: &R) -> Result<Vec<Violation>, EngineFault>;
}

/// Engine backed by `#[derive(Validate)]`
///
/// A panic inside a rule (typically a custom validator function) is caught
/// and reported as an `EngineFault`. The process panic hook still runs
/// first, so the default hook prints the panic message to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorEngine;

impl RuleEngine for ValidatorEngine {
    fn evaluate<R: Validate + Record>(&self, record: &R) -> Result<Vec<Violation>, EngineFault> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| record.validate()))
            .map_err(|payload| EngineFault::from_panic(payload.as_ref()))?;

        match outcome {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(flatten(R::shape(), &errors)),
        }
    }
}

/// Flatten `validator` errors into ordered violations
///
/// A failed nested struct or list is not descended into; it yields a single
/// `nested` violation on the top-level field that holds it.
pub fn flatten(shape: &RecordShape, errors: &ValidationErrors) -> Vec<Violation> {
    let mut by_field: Vec<_> = errors.errors().iter().collect();
    by_field.sort_by_cached_key(|(field, _)| {
        let field: &str = field.as_ref();
        (shape.position(field).unwrap_or(usize::MAX), field.to_owned())
    });

    let mut violations = Vec::new();
    for (field, kind) in by_field {
        let field: &str = field.as_ref();
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                violations.extend(field_errors.iter().map(|error| to_violation(field, error)));
            }
            ValidationErrorsKind::Struct(_) | ValidationErrorsKind::List(_) => {
                debug!(record = shape.name(), field = %field, "nested validation failed");
                violations.push(Violation::new(field, NESTED_TAG));
            }
        }
    }
    violations
}

fn to_violation(field: &str, error: &ValidationError) -> Violation {
    let code: &str = &error.code;
    let bound = match code {
        "length" => length_bound(&error.params),
        "range" => range_bound(&error.params),
        _ => None,
    };
    let violation = match bound {
        Some((tag, param)) => Violation::new(field, tag).with_param(param),
        None => Violation::new(field, code),
    };
    match &error.message {
        Some(message) => violation.with_default_message(message.to_string()),
        None => violation.with_default_message(default_description(field, code)),
    }
}

/// Pick the failed bound of a `length` rule
///
/// Compares the measured value against `equal`, `min` and `max`. When the
/// value is not reported, a rule declaring a single bound still resolves.
fn length_bound(params: &Params) -> Option<(&'static str, String)> {
    let bound = |name: &str| params.get(name).and_then(Value::as_u64);
    let measured = params.get("value").and_then(measured_length);

    if let Some(len) = measured {
        if let Some(equal) = bound("equal").filter(|equal| len != *equal) {
            return Some(("len", equal.to_string()));
        }
        if let Some(min) = bound("min").filter(|min| len < *min) {
            return Some(("min", min.to_string()));
        }
        if let Some(max) = bound("max").filter(|max| len > *max) {
            return Some(("max", max.to_string()));
        }
    }

    match (bound("min"), bound("max"), bound("equal")) {
        (Some(min), None, None) => Some(("min", min.to_string())),
        (None, Some(max), None) => Some(("max", max.to_string())),
        (None, None, Some(equal)) => Some(("len", equal.to_string())),
        _ => None,
    }
}

fn measured_length(value: &Value) -> Option<u64> {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return None,
    };
    u64::try_from(len).ok()
}

/// Pick the failed bound of a `range` rule, mapped onto comparison tags
fn range_bound(params: &Params) -> Option<(&'static str, String)> {
    let checks: [(&str, &'static str, fn(f64, f64) -> bool); 4] = [
        ("min", "gte", |value, bound| value < bound),
        ("exclusive_min", "gt", |value, bound| value <= bound),
        ("max", "lte", |value, bound| value > bound),
        ("exclusive_max", "lt", |value, bound| value >= bound),
    ];
    let value = params.get("value").and_then(Value::as_f64);

    for (name, tag, violated) in checks {
        let Some(bound) = params.get(name) else { continue };
        if let (Some(value), Some(limit)) = (value, bound.as_f64()) {
            if violated(value, limit) {
                return Some((tag, param_text(bound)));
            }
        }
    }

    let declared: Vec<_> = checks
        .iter()
        .filter(|(name, ..)| params.contains_key(*name))
        .collect();
    match declared.as_slice() {
        [(name, tag, _)] => params.get(*name).map(|bound| (*tag, param_text(bound))),
        _ => None,
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
