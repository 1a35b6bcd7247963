//! # Message Catalog
//!
//! Tag-to-template table used to turn rule violations into readable text.
//!
//! A `MessageCatalog` is a cheap, cloneable handle: every clone shares the
//! same table, so a template registered through one handle is visible to all
//! validators holding another. Separate catalogs are fully isolated.

use crate::engine::Violation;
use crate::error::Result;
use crate::json::parse_json;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Substitution slot for a rule parameter inside a template
pub const PARAM_PLACEHOLDER: &str = "{param}";

/// Templates every new catalog starts with
pub const BUILTIN_MESSAGES: &[(&str, &str)] = &[
    ("required", "field is required"),
    ("min", "minimum field length is {param}"),
    ("max", "maximum field length is {param}"),
    ("len", "field length must be exactly {param}"),
    ("lt", "field value must be less than {param}"),
    ("lte", "field value must be less than or equal to {param}"),
    ("gt", "field value must be greater than {param}"),
    ("gte", "field value must be greater than or equal to {param}"),
    ("lowercase", "field value must be all lowercase"),
    ("email", "field value must be a valid email"),
    (
        "password",
        "password must contain at least one uppercase letter, one lowercase letter, one number, and one special character",
    ),
];

/// Shared, thread-safe message table
///
/// # Example
///
/// ```
/// use valmsg::{MessageCatalog, Violation};
///
/// let catalog = MessageCatalog::new();
/// catalog.register("min", "at least {param} characters");
///
/// let violation = Violation::new("username", "min").with_param("6");
/// assert_eq!(catalog.resolve(&violation), "at least 6 characters");
/// ```
#[derive(Clone)]
pub struct MessageCatalog {
    templates: Arc<RwLock<HashMap<String, String>>>,
}

impl MessageCatalog {
    /// Create a catalog seeded with [`BUILTIN_MESSAGES`]
    #[must_use]
    pub fn new() -> Self {
        let catalog = Self::empty();
        catalog.register_all(BUILTIN_MESSAGES.iter().copied());
        catalog
    }

    /// Create a catalog with no templates at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a template for a tag
    ///
    /// Overwrites any existing template, built-in or not. Takes effect for
    /// every holder of this catalog immediately.
    pub fn register(&self, tag: impl Into<String>, template: impl Into<String>) {
        let tag = tag.into();
        trace!(tag = %tag, "registering validation message");
        self.write().insert(tag, template.into());
    }

    /// Register many templates at once, later entries winning
    pub fn register_all<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut templates = self.write();
        for (tag, template) in entries {
            templates.insert(tag.into(), template.into());
        }
    }

    /// Register every entry of a JSON object mapping tags to templates
    ///
    /// Returns the number of entries registered.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if `json` is not an object of strings; the
    /// catalog is left untouched in that case.
    pub fn load_json(&self, json: &str) -> Result<usize> {
        let overrides: IndexMap<String, String> = parse_json(json)?;
        let count = overrides.len();
        self.register_all(overrides);
        Ok(count)
    }

    /// Current template for a tag
    #[must_use]
    pub fn template(&self, tag: &str) -> Option<String> {
        self.read().get(tag).cloned()
    }

    /// Check if a tag has a template
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.read().contains_key(tag)
    }

    /// Number of registered templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no template is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the message for one violation
    ///
    /// Unknown tags fall back to the engine's own description. A template
    /// whose placeholder gets no parameter is returned as is, placeholder
    /// included.
    #[must_use]
    pub fn resolve(&self, violation: &Violation) -> String {
        let templates = self.read();
        let Some(template) = templates.get(&violation.tag) else {
            return violation.default_message.clone();
        };
        if violation.param.is_empty() {
            template.clone()
        } else {
            format_template(template, &violation.param)
        }
    }

    // A panic while holding the lock cannot leave a half-inserted entry
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let templates = self.read();
        let mut tags: Vec<_> = templates.keys().collect();
        tags.sort();
        f.debug_struct("MessageCatalog").field("tags", &tags).finish()
    }
}

/// Substitute `param` into the first placeholder of `template`
///
/// Templates without a placeholder come back unchanged.
#[must_use]
pub fn format_template(template: &str, param: &str) -> String {
    template.replacen(PARAM_PLACEHOLDER, param, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let catalog = MessageCatalog::new();
        for tag in [
            "required", "min", "max", "lt", "lte", "gt", "gte", "lowercase", "email", "password",
        ] {
            assert!(catalog.contains(tag), "missing built-in {tag}");
        }
        assert_eq!(catalog.len(), BUILTIN_MESSAGES.len());
        assert!(MessageCatalog::empty().is_empty());
    }

    #[test]
    fn test_resolve_substitutes_param_once() {
        let catalog = MessageCatalog::new();
        let violation = Violation::new("username", "min").with_param("6");
        assert_eq!(catalog.resolve(&violation), "minimum field length is 6");

        catalog.register("between", "{param} or {param}");
        let violation = Violation::new("size", "between").with_param("6");
        assert_eq!(catalog.resolve(&violation), "6 or {param}");
    }

    #[test]
    fn test_resolve_without_param() {
        let catalog = MessageCatalog::new();
        let violation = Violation::new("email", "email");
        assert_eq!(catalog.resolve(&violation), "field value must be a valid email");
    }

    #[test]
    fn test_dangling_placeholder_left_visible() {
        let catalog = MessageCatalog::new();
        let violation = Violation::new("username", "min");
        assert_eq!(catalog.resolve(&violation), "minimum field length is {param}");
    }

    #[test]
    fn test_param_ignored_without_placeholder() {
        let catalog = MessageCatalog::new();
        let violation = Violation::new("name", "required").with_param("6");
        assert_eq!(catalog.resolve(&violation), "field is required");
    }

    #[test]
    fn test_unknown_tag_falls_back_to_engine_text() {
        let catalog = MessageCatalog::new();
        let violation = Violation::new("website", "url");
        let message = catalog.resolve(&violation);
        assert!(!message.is_empty());
        assert_eq!(message, violation.default_message);

        let violation = Violation::new("website", "url").with_default_message("not a url");
        assert_eq!(catalog.resolve(&violation), "not a url");
    }

    #[test]
    fn test_register_overrides_builtin() {
        let catalog = MessageCatalog::new();
        catalog.register("required", "cannot be blank");
        assert_eq!(
            catalog.resolve(&Violation::new("name", "required")),
            "cannot be blank"
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let once = MessageCatalog::new();
        once.register("slug", "must be a slug of {param}");
        let twice = MessageCatalog::new();
        twice.register("slug", "must be a slug of {param}");
        twice.register("slug", "must be a slug of {param}");

        let violation = Violation::new("path", "slug").with_param("ascii");
        assert_eq!(once.resolve(&violation), twice.resolve(&violation));
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_clones_share_table() {
        let catalog = MessageCatalog::new();
        let handle = catalog.clone();
        handle.register("url", "field value must be a valid url");
        assert_eq!(
            catalog.template("url").as_deref(),
            Some("field value must be a valid url")
        );
    }

    #[test]
    fn test_catalogs_are_isolated() {
        let first = MessageCatalog::new();
        let second = MessageCatalog::new();
        first.register("email", "bad email");
        assert_eq!(
            second.template("email").as_deref(),
            Some("field value must be a valid email")
        );
    }

    #[test]
    fn test_load_json() {
        let catalog = MessageCatalog::new();
        let count = catalog
            .load_json(r#"{"required": "must be set", "url": "not a url"}"#)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(catalog.template("required").as_deref(), Some("must be set"));
        assert!(catalog.contains("url"));
    }

    #[test]
    fn test_load_json_rejects_non_strings() {
        let catalog = MessageCatalog::new();
        assert!(catalog.load_json(r#"{"min": 6}"#).is_err());
        assert_eq!(
            catalog.template("min").as_deref(),
            Some("minimum field length is {param}")
        );
    }

    #[test]
    fn test_debug_lists_tags() {
        let catalog = MessageCatalog::empty();
        catalog.register("b", "two");
        catalog.register("a", "one");
        assert_eq!(format!("{catalog:?}"), r#"MessageCatalog { tags: ["a", "b"] }"#);
    }

    #[test]
    fn test_catalog_thread_safe() {
        use std::thread;

        let catalog = MessageCatalog::new();
        let handle = catalog.clone();

        let writer = thread::spawn(move || {
            handle.register("thread", "from {param}");
        });

        writer.join().unwrap();
        let violation = Violation::new("x", "thread").with_param("worker");
        assert_eq!(catalog.resolve(&violation), "from worker");
    }
}
